//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
// Enables the `js` entropy source that `rand` needs in the browser.
use getrandom as _;

// Modules
pub mod cms;
pub mod components;
mod pages;

// Top-Level pages
use crate::pages::blog::Blog;
use crate::pages::blog_post::BlogPost;
use crate::pages::careers::Careers;
use crate::pages::case_studies::CaseStudies;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let level = if cfg!(debug_assertions) {
		Level::Debug
	} else {
		Level::Info
	};
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("Logging initialized at {level}");
}

/// An app router for the site pages that handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Crok4IT - Expert IT Consulting" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<nav class="site-nav">
				<a href="/">"Home"</a>
				<a href="/case-studies">"Case Studies"</a>
				<a href="/blog">"Insights"</a>
				<a href="/careers">"Careers"</a>
			</nav>
			<main>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Home />
					<Route path=path!("/blog") view=Blog />
					<Route path=path!("/blog/:slug") view=BlogPost />
					<Route path=path!("/careers") view=Careers />
					<Route path=path!("/case-studies") view=CaseStudies />
				</Routes>
			</main>
		</Router>
	}
}
