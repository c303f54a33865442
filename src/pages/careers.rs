use leptos::prelude::*;

use crate::components::backdrop::{BackdropCanvas, BackdropConfig};

const NO_OPENINGS: &str =
	"We have no open positions right now. Send us a note and we will keep you in mind.";

/// Careers page over the pulsing network backdrop.
#[component]
pub fn Careers() -> impl IntoView {
	view! {
		<section class="page-header">
			<BackdropCanvas config=BackdropConfig::network() label="careers" />
			<div class="page-header-content">
				<h1>"Careers"</h1>
				<p class="subtitle">"Build the systems our clients run their business on."</p>
			</div>
		</section>
		<section class="page-body">
			<p>{NO_OPENINGS}</p>
		</section>
	}
}
