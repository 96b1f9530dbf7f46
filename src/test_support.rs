use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt as _, registry::Registry};

static INIT: Once = Once::new();

pub(crate) fn init() {
	INIT.call_once(|| {
		let layer = tracing_tree::HierarchicalLayer::default()
			.with_writer(tracing_subscriber::fmt::TestWriter::new())
			.with_indent_lines(true)
			.with_indent_amount(2)
			.with_targets(true);

		let sub = Registry::default().with(layer);
		tracing::subscriber::set_global_default(sub).unwrap();
	});
}
