use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    //  Environment variable parameter - the distributed directory
    let Ok(staging_dir) = env::var("TRUNK_STAGING_DIR") else {
        eprintln!("TRUNK_STAGING_DIR is not set, run this as a Trunk hook");
        process::exit(1);
    };

    //  Using the configured html output name (set in Trunk.toml)
    let staged_html_path = PathBuf::from(staging_dir).join("BodyViewer.html");

    let html = match fs::read_to_string(&staged_html_path) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Failed to read {}: {}", staged_html_path.display(), e);
            process::exit(1);
        }
    };

    // Asset paths must stay relative to the page.
    let html = html
        .replace("/body-viewer.js", "./body-viewer.js")
        .replace("/body-viewer_bg.wasm", "./body-viewer_bg.wasm");

    if let Err(e) = fs::write(&staged_html_path, html) {
        eprintln!("Failed to write {}: {}", staged_html_path.display(), e);
        process::exit(1);
    }
}
