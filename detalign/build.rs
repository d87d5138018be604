//! Bundles the per-language relation sets in `configs/<lang>/relations.json` into a single JSON map
//! keyed by language code, which `lang.rs` embeds. These are the compiled-in defaults; the binaries
//! can replace them with a JSON file at runtime.

use fs_err as fs;
use std::{collections::BTreeMap, io::BufWriter, path::Path};

const CONFIG: &str = "relations.json";
const BUNDLE: &str = "relations_configs.json";

fn main() {
    let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set for build scripts");

    println!("cargo:rerun-if-changed={}", config_dir.display());

    let mut relations: BTreeMap<String, serde_json::Value> = BTreeMap::new();

    for entry in fs::read_dir(&config_dir).expect("configs/ is readable") {
        let lang_dir = entry.expect("configs/ entry is readable").path();
        if !lang_dir.is_dir() {
            continue;
        }

        let lang_code = lang_dir
            .file_name()
            .and_then(|x| x.to_str())
            .expect("language directory names are unicode")
            .to_owned();
        let config = lang_dir.join(CONFIG);
        println!("cargo:rerun-if-changed={}", config.display());

        let text = fs::read_to_string(&config)
            .unwrap_or_else(|_| panic!("{} is missing for '{}'", CONFIG, lang_code));
        let value = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("{} for '{}' is invalid: {}", CONFIG, lang_code, e));

        relations.insert(lang_code, value);
    }

    let writer = BufWriter::new(
        fs::File::create(Path::new(&out_dir).join(BUNDLE)).expect("OUT_DIR is writable"),
    );
    serde_json::to_writer(writer, &relations).expect("relation sets serialize to JSON");
}
