use leptos::prelude::*;

use crate::components::flow_canvas::FlowCanvas;
use crate::graph::{CellValue, Column, Table};

const SAMPLE_ROWS: usize = 60;
const REGIONS: &[&str] = &["North", "South", "East", "West"];
const PRODUCTS: &[&str] = &["Bikes", "Helmets", "Locks", "Lights", "Pumps", "Tyres"];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn pick<'a>(items: &[&'a str], seed: usize) -> &'a str {
	items[(rand_simple(seed) * items.len() as f64) as usize % items.len()]
}

/// Sample sales table; `visible` limits how many of its columns are shown.
fn generate_sample_table(visible: usize) -> Table {
	let columns = vec![
		Column::grouping("region", "Region"),
		Column::grouping("store", "Store"),
		Column::grouping("product", "Product"),
		Column::aggregate("revenue", "Revenue"),
		Column::aggregate("discount", "Discount"),
	];
	let rows = (0..SAMPLE_ROWS)
		.map(|i| {
			let revenue = (rand_simple(i * 7) * 500.0).round();
			vec![
				CellValue::from(pick(REGIONS, i)),
				CellValue::from(format!("Store {}", i % 17).as_str()),
				CellValue::from(pick(PRODUCTS, i * 3)),
				CellValue::from(revenue),
				CellValue::from((revenue * 0.1 * rand_simple(i * 11)).round()),
			]
		})
		.collect::<Vec<Vec<CellValue>>>();

	let visible = visible.clamp(1, columns.len());
	Table::new(
		columns[..visible].to_vec(),
		rows.into_iter().map(|row| row[..visible].to_vec()).collect(),
	)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (visible, set_visible) = signal(2usize);
	let table = Signal::derive(move || generate_sample_table(visible.get()));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<FlowCanvas table=table fullscreen=true />
				<div class="graph-overlay">
					<h1>"Column Flow"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Shift-drag between nodes to connect them. "
						"Double-click a node, then reveal a column to place it underneath."
					</p>
					<button on:click=move |_| set_visible.update(|n| *n += 1)>
						"Reveal next column"
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
