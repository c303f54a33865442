use leptos::prelude::*;

use crate::cms::{Article, CmsClient};
use crate::components::backdrop::{BackdropCanvas, BackdropConfig};

const LOAD_FAILED: &str = "Could not load articles at this time. Please try again later.";

/// Article list over the floating geometry backdrop.
#[component]
pub fn Blog() -> impl IntoView {
	let articles = LocalResource::new(|| async { CmsClient::from_env().articles().await });

	view! {
		<section class="page-header">
			<BackdropCanvas config=BackdropConfig::floating_geometry() label="blog" />
			<div class="page-header-content">
				<h1>"Our Insights"</h1>
			</div>
		</section>
		<section class="page-body">
			<Suspense fallback=|| view! { <p>"Loading articles..."</p> }>
				{move || Suspend::new(async move {
					let articles = articles.await;
					if articles.is_empty() {
						view! { <p>{LOAD_FAILED}</p> }.into_any()
					} else {
						view! {
							<ul class="article-list">
								{articles.into_iter().map(article_card).collect_view()}
							</ul>
						}
							.into_any()
					}
				})}
			</Suspense>
		</section>
	}
}

fn article_card(article: Article) -> impl IntoView {
	let href = format!("/blog/{}", article.slug);
	view! {
		<li class="article-card">
			<a href=href>
				<h2>{article.title.clone()}</h2>
			</a>
			<p class="meta">{format!("{} · {}", article.author, article.published_on())}</p>
			<p>{article.excerpt}</p>
		</li>
	}
}
