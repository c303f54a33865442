use leptos::prelude::*;

use crate::components::backdrop::{BackdropCanvas, BackdropConfig};

const TAGLINE: &str =
	"We architect, build, and secure the technology foundations that drive business growth.";

/// Landing page with the particle-field hero.
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<section class="hero">
			<BackdropCanvas config=BackdropConfig::hero() label="hero" />
			<div class="hero-content">
				<h1>"Your Strategic Partner in Technology"</h1>
				<p class="subtitle">{TAGLINE}</p>
				<a class="button" href="/case-studies">"See our work"</a>
			</div>
		</section>
	}
}
