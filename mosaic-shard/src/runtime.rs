use std::{io, sync::OnceLock};

use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Shared multi-thread runtime for hosts that are not async themselves.
pub fn get() -> io::Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("mosaic-shard")
        .build()?;
    Ok(RUNTIME.get_or_init(|| runtime))
}
