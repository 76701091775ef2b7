use std::fs;
use std::path::{Path, PathBuf};
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};

/// Per-vault config space shared with the host app; plugin state lives in
/// its own file so the host's settings.json is never touched.
const CONFIG_DIR: &str = ".bedrock";
const SETTINGS_FILE: &str = "backlinks.json";

/// The frontend listens for this exact name to pick up saves made from
/// another window; both crates pin it with a test.
const SETTINGS_UPDATED_EVENT: &str = "backlink-settings-updated";

fn settings_path(vault_path: &str) -> PathBuf {
    Path::new(vault_path).join(CONFIG_DIR).join(SETTINGS_FILE)
}

fn read_settings_blob(vault_path: &str) -> String {
    // An absent or unreadable file is not an error: the frontend merges
    // an empty record over its defaults.
    fs::read_to_string(settings_path(vault_path)).unwrap_or_else(|_| "{}".to_string())
}

fn write_settings_blob(vault_path: &str, settings: &str) -> Result<(), String> {
    let config_dir = Path::new(vault_path).join(CONFIG_DIR);
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).map_err(|e| e.to_string())?;
    }
    fs::write(config_dir.join(SETTINGS_FILE), settings).map_err(|e| e.to_string())
}

#[tauri::command]
fn resolve_vault(app_handle: tauri::AppHandle) -> Result<String, String> {
    let docs = app_handle
        .path()
        .document_dir()
        .map_err(|e| e.to_string())?;
    let vault_path = docs.join("BedrockVault");

    if !vault_path.exists() {
        fs::create_dir_all(&vault_path).map_err(|e| e.to_string())?;
    }

    let config_path = vault_path.join(CONFIG_DIR);
    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| e.to_string())?;
    }

    Ok(vault_path.to_string_lossy().into_owned())
}

#[tauri::command]
fn load_backlink_settings(vault_path: &str) -> Result<String, String> {
    Ok(read_settings_blob(vault_path))
}

#[tauri::command]
fn save_backlink_settings(app: AppHandle, vault_path: &str, settings: &str) -> Result<(), String> {
    write_settings_blob(vault_path, settings)?;
    let _ = app.emit(SETTINGS_UPDATED_EVENT, settings);
    Ok(())
}

#[tauri::command]
fn open_settings_window(app: AppHandle) -> Result<(), String> {
    if let Some(window) = app.get_webview_window("backlink-settings") {
        window.set_focus().map_err(|e| e.to_string())?;
    } else {
        WebviewWindowBuilder::new(
            &app,
            "backlink-settings",
            WebviewUrl::App("index.html?settings=true".into()),
        )
        .title("Backlink Settings")
        .inner_size(560.0, 420.0)
        .build()
        .map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .invoke_handler(tauri::generate_handler![
            resolve_vault,
            load_backlink_settings,
            save_backlink_settings,
            open_settings_window
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_without_file_yields_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().to_string_lossy().into_owned();
        assert_eq!(read_settings_blob(&vault), "{}");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().to_string_lossy().into_owned();
        let blob = r#"{"collapseResults":true,"showMoreContext":false,"sortOrder":"byModifiedTime"}"#;

        write_settings_blob(&vault, blob).unwrap();
        assert_eq!(read_settings_blob(&vault), blob);
    }

    #[test]
    fn save_creates_the_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().to_string_lossy().into_owned();

        write_settings_blob(&vault, "{}").unwrap();
        assert!(dir.path().join(CONFIG_DIR).join(SETTINGS_FILE).is_file());
    }

    #[test]
    fn settings_broadcast_event_name_is_stable() {
        // The frontend listener is registered under the same literal;
        // renaming one side silently orphans the other.
        assert_eq!(SETTINGS_UPDATED_EVENT, "backlink-settings-updated");
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().to_string_lossy().into_owned();

        write_settings_blob(&vault, r#"{"collapseResults":true}"#).unwrap();
        write_settings_blob(&vault, r#"{"collapseResults":false}"#).unwrap();
        assert_eq!(read_settings_blob(&vault), r#"{"collapseResults":false}"#);
    }
}
