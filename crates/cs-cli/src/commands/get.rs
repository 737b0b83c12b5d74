//! Get command implementation

use crate::cli::{GetArgs, GlobalArgs};
use crate::commands::common;
use anyhow::Result;
use cs_engine::GetCardRequest;

/// Execute the get command
pub(crate) async fn execute(args: &GetArgs, global: &GlobalArgs) -> Result<()> {
    let service = common::build_service(global)?;

    let mut request = GetCardRequest::new(args.id);
    request.ignore_view = args.ignore_view.then_some(true);
    request.translate_mbql = !args.no_translate;

    common::finish(&service.get(request).await)
}
