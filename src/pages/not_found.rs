use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<section class="page-body">
			<h1>"Page not found"</h1>
			<a href="/">"Back home"</a>
		</section>
	}
}
