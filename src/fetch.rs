use std::sync::Arc;
use tracing::info;

use crate::cli::{FetchArgs, OutputFormat};
use sheetpull::client::SheetClient;
use sheetpull::config::Config;
use sheetpull::error::SheetError;
use sheetpull::options::OptionBag;
use sheetpull::render::MarkupDocument;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(args: FetchArgs) -> Result<(), AnyError> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };
    if let Some(kind) = args.transport {
        config.transport.kind = kind;
    }

    let client = SheetClient::from_config(&config)?;
    let document = Arc::new(if args.table {
        MarkupDocument::table()
    } else {
        MarkupDocument::block()
    });

    let mut bag = OptionBag {
        url: args.url,
        query: args.query,
        chunk_size: args.chunk_size,
        labels: (!args.labels.is_empty()).then_some(args.labels),
        row_template: None,
        headers: args.headers,
        reset: args.reset.then_some(true),
    };

    let mut pages = 0;
    while args.pages == 0 || pages < args.pages {
        let options = client.options(bag.clone()).with_target(document.clone());

        let response = match client.fetch(options).await {
            Ok(response) => response,
            Err(failure) if matches!(failure.error, SheetError::AlreadyLoaded) => {
                info!("All rows loaded");
                break;
            }
            Err(failure) => return Err(failure.into()),
        };

        if args.format == OutputFormat::Json {
            for row in &response.rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }

        // Only the first page resets.
        bag.reset = None;
        pages += 1;
    }

    if args.format == OutputFormat::Html {
        println!("{}", document.to_markup());
    }

    let metrics = client.metrics();
    info!(
        pages,
        requests = metrics.requests_dispatched,
        rows = metrics.rows_parsed,
        "Fetch finished"
    );

    Ok(())
}
