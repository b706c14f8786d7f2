use learnhub_core::storage::Storage;

/// Opens the local database for the direct write path. Requires both the
/// database path and the privileged SQLCipher key; without the key the direct
/// path stays disabled and every operation goes through the upstream proxy.
pub(crate) fn open_storage() -> Option<Storage> {
    let path = std::env::var("LEARNHUB_DB_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())?;
    let key = std::env::var("LEARNHUB_DB_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty())?;
    match Storage::open_encrypted(&path, &key) {
        Ok(storage) => Some(storage),
        Err(err) => {
            log::warn!("storage open failed: path={}, err={}", path, err);
            None
        }
    }
}

pub(crate) fn initialize_storage() -> Result<(), String> {
    let Some(storage) = open_storage() else {
        // Direct path not configured; nothing to migrate.
        return Ok(());
    };
    storage.init().map_err(|err| err.to_string())
}
