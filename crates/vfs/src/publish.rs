//! Reading a tool's specification files

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::directory::{Directory, SpecDirectory};
use crate::error::ItemResult;
use crate::session::Session;
use crate::store::ToolKind;
use crate::tool::Restriction;

/// Read the named specification files of a tool
///
/// Names the tool does not publish, and names missing from its directory,
/// are left out of the result. The directory handle is disabled before
/// returning.
pub async fn load_specification(
    session: &Session,
    kind: ToolKind,
    tool_id: &str,
    names: &[&str],
) -> ItemResult<BTreeMap<String, Vec<u8>>> {
    let tool = session.games().tool(kind, tool_id).await?;
    let restriction = Restriction::parse(tool.files.as_deref());
    let dir = SpecDirectory::open(session.root().shared_files(), session.user().clone(), &tool.path).await?;

    let mut result = BTreeMap::new();
    let outcome = read_files(&dir, &restriction, names, &mut result).await;
    dir.disable();
    outcome?;

    debug!(tool = tool_id, requested = names.len(), found = result.len(), "loaded specification");
    Ok(result)
}

async fn read_files(
    dir: &SpecDirectory,
    restriction: &Restriction,
    names: &[&str],
    result: &mut BTreeMap<String, Vec<u8>>,
) -> ItemResult<()> {
    for &name in names {
        if !restriction.allows(name) {
            warn!(name, tool = dir.title(), "file not published");
            continue;
        }
        if let Some(stream) = dir.open_file_nt(name).await? {
            result.insert(name.to_string(), stream.into_inner());
        }
    }
    Ok(())
}
