use leptos::prelude::*;

use crate::components::backdrop::{BackdropCanvas, BackdropConfig};

/// Case study index over the particle wave backdrop.
#[component]
pub fn CaseStudies() -> impl IntoView {
	view! {
		<section class="page-header">
			<BackdropCanvas config=BackdropConfig::particle_wave() label="case-studies" />
			<div class="page-header-content">
				<h1>"Case Studies"</h1>
				<p class="subtitle">"Selected work across infrastructure, security and product."</p>
			</div>
		</section>
	}
}
