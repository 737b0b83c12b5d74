//! Update command implementation

use crate::cli::{GlobalArgs, UpdateArgs};
use crate::commands::common;
use anyhow::Result;
use cs_engine::UpdateCardRequest;

/// Execute the update command
pub(crate) async fn execute(args: &UpdateArgs, global: &GlobalArgs) -> Result<()> {
    let request = build_request(args)?;
    let service = common::build_service(global)?;
    common::finish(&service.update(request).await)
}

fn build_request(args: &UpdateArgs) -> Result<UpdateCardRequest> {
    let mut request = UpdateCardRequest::new(args.id);
    request.query_type = args.query_type.map(|t| t.as_str().to_string());
    request.query = common::read_query(args.query_type, &args.source)?;
    request.name = args.name.clone();
    request.description = common::patch(args.description.clone(), args.clear_description);
    request.collection_id = common::patch(args.collection, args.clear_collection);
    request.archived = args.archived;
    request.display = args.display.clone();
    request.visualization_settings =
        common::parse_json_arg("visualization", args.visualization.as_deref())?;
    request.parameters = common::parameter_input(args.parameters.as_deref());
    Ok(request)
}

#[cfg(test)]
#[path = "update_test.rs"]
mod tests;
