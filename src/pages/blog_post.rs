use leptos::prelude::*;
use leptos_meta::{Meta, Title};
use leptos_router::hooks::use_params_map;

use crate::cms::{Article, CmsClient};

const SITE_NAME: &str = "Crok4IT";
const NOT_FOUND_TITLE: &str = "Post Not Found";
const NOT_FOUND_DESCRIPTION: &str = "The requested blog post could not be found.";

/// Single article looked up by the `slug` route parameter.
#[component]
pub fn BlogPost() -> impl IntoView {
	let params = use_params_map();
	let slug = move || params.with(|p| p.get("slug")).unwrap_or_default();
	let article = LocalResource::new(move || {
		let slug = slug();
		async move { CmsClient::from_env().article_by_slug(&slug).await }
	});

	view! {
		<Suspense fallback=|| view! { <p>"Loading..."</p> }>
			{move || Suspend::new(async move {
				let article = article.await;
				let (title, description) = head_for(article.as_ref());
				let body = match article {
					Some(article) => {
						let html = article.content_html();
						view! {
							<article class="page-body">
								<a href="/blog">"Back to insights"</a>
								<h1>{article.title.clone()}</h1>
								<p class="meta">
									{format!("{} · {}", article.author, article.published_on())}
								</p>
								<div class="article-content" inner_html=html></div>
							</article>
						}
							.into_any()
					}
					None => {
						view! {
							<section class="page-body">
								<h1>"Post not found"</h1>
								<a href="/blog">"Back to insights"</a>
							</section>
						}
							.into_any()
					}
				};
				view! {
					<Title text=title />
					<Meta name="description" content=description />
					{body}
				}
			})}
		</Suspense>
	}
}

/// Document title and description for a looked-up post.
fn head_for(article: Option<&Article>) -> (String, String) {
	match article {
		Some(article) => (
			format!("{} | {SITE_NAME}", article.title),
			article.excerpt.clone(),
		),
		None => (NOT_FOUND_TITLE.to_string(), NOT_FOUND_DESCRIPTION.to_string()),
	}
}
