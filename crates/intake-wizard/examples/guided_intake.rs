//! Walk the intake wizard end to end: an extraction stream fills fields in
//! the background while the operator edits and navigates, then submits.
//!
//! Run with: cargo run --example guided_intake

use intake_wizard::{
    decode_events, pump_events, steps, BoxFuture, Document, Error, SubmitSink, WizardController,
};
use serde_json::json;

/// Stand-in for the real persistence endpoint.
struct PrintlnSink;

impl SubmitSink for PrintlnSink {
    fn submit(&self, document: Document) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            println!(
                "submitting profile for {:?} ({} products)",
                document.text("companyName"),
                document.list_len("products"),
            );
            Ok(())
        })
    }
}

fn print_progress(ctrl: &WizardController) {
    let marks: Vec<String> = steps::STEPS
        .iter()
        .map(|s| {
            let mark = if ctrl.is_step_completed(s.index) { "x" } else { " " };
            format!("[{mark}] {}", s.name)
        })
        .collect();
    println!("progress: {}", marks.join("  "));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_wizard=info".into()),
        )
        .init();

    let controller = WizardController::shared();

    // A canned extraction stream, as the service would send it.
    let body = "\
data: {\"type\":\"status\",\"message\":\"Reading https://acme.test\"}\n\
data: {\"type\":\"section\",\"section\":\"company\",\"data\":{\"companyName\":\"Acme\",\"location\":{\"state\":\"CA\"}}}\n\
data: {\"type\":\"section\",\"section\":\"products\",\"data\":{\"products\":[{\"name\":\"Widget\",\"overview\":\"A modular widget platform for assembling industrial automation lines.\"}]}}\n\
data: {\"type\":\"complete\",\"data\":{\"companyName\":\"Acme Corp\",\"location\":{\"country\":\"US\"}}}\n";
    let chunks = futures::stream::iter(
        body.as_bytes()
            .chunks(16)
            .map(|c| Ok::<_, std::io::Error>(bytes::Bytes::copy_from_slice(c)))
            .collect::<Vec<_>>(),
    );

    {
        let mut ctrl = controller.lock().unwrap();
        ctrl.update_text("sourceUrl", "https://acme.test");
        ctrl.begin_parse();
    }
    let cancel = controller.lock().unwrap().cancellation_token().child_token();
    pump_events(controller.clone(), decode_events(chunks), cancel).await;

    let mut ctrl = controller.lock().unwrap();
    println!("extracted company: {}", ctrl.document().text("companyName"));
    print_progress(&ctrl);

    // The operator fills in what extraction could not know.
    ctrl.next(); // leave the source step
    ctrl.update_text("website", "https://acme.test");
    ctrl.next();
    ctrl.update_text("primaryContact.name", "Ada Lovelace");
    ctrl.update_text("primaryContact.email", "ada@acme.test");
    ctrl.next();
    ctrl.next(); // products already extracted
    ctrl.update_field("industries", json!(["Robotics", "Manufacturing"]));
    ctrl.next();
    ctrl.next(); // compliance left empty: skippable, just not "done"
    print_progress(&ctrl);

    ctrl.submit(&PrintlnSink).await?;
    println!("wizard closed: {}", !ctrl.is_open());
    Ok(())
}
