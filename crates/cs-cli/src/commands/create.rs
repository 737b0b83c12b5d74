//! Create command implementation

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common;
use anyhow::{Context, Result};
use cs_engine::CreateCardRequest;

/// Execute the create command
pub(crate) async fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let query = common::read_query(Some(args.query_type), &args.source)?
        .context("--query or --query-file is required")?;
    let visualization = common::parse_json_arg("visualization", args.visualization.as_deref())?;

    let mut request =
        CreateCardRequest::new(args.database, args.query_type.as_str(), query, &args.name);
    request.card_type = args.card_type.clone();
    request.collection_id = args.collection;
    request.description = args.description.clone();
    request.display = args.display.clone();
    request.visualization_settings = visualization;
    request.parameters = common::parameter_input(args.parameters.as_deref());

    let service = common::build_service(global)?;
    common::finish(&service.create(request).await)
}
