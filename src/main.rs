//! Command-line entry point.
//!
//! Thin wrapper over the library: lists samples, renders a sample's
//! annotations onto its image, or deletes a sample.

use std::path::Path;

use ab_glyph::FontArc;

use cardlabel::client::SampleClient;
use cardlabel::config::AppConfig;
use cardlabel::format::shapes_from_records;
use cardlabel::model::AnnotationSet;
use cardlabel::Renderer;

const CONFIG_FILE: &str = "cardlabel.json";

fn main() {
    let config = match AppConfig::load_or_default(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", CONFIG_FILE, e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .init();

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let client = SampleClient::new(&config.base_url);

    match args.first().map(String::as_str) {
        Some("list") => {
            let page = args.get(1).map_or(Ok(0), |a| a.parse())?;
            let size = args.get(2).map_or(Ok(10), |a| a.parse())?;
            let listing = client.list_samples(page, size)?;
            println!(
                "{} samples ({} pages):",
                listing.total_samples, listing.total_pages
            );
            for sample in &listing.samples {
                println!(
                    "  {:>6}  {}  {}",
                    sample.sample_id,
                    sample.image_path,
                    sample.create_at.as_deref().unwrap_or("-")
                );
            }
        }
        Some("render") => {
            let id: u64 = args.get(1).ok_or("usage: cardlabel render <id> <out.png>")?.parse()?;
            let out = args.get(2).ok_or("usage: cardlabel render <id> <out.png>")?;

            let detail = client.get_sample(id)?;
            let background = client.fetch_image(&detail.image_path)?;
            let catalog = config.catalog();
            let shapes = shapes_from_records(&detail.labels, &catalog);
            let set = AnnotationSet::from_shapes(shapes);

            let renderer = match load_font(config) {
                Some(font) => Renderer::with_font(font),
                None => Renderer::new(),
            };
            let rendered = renderer.render(&background, &set, None, &catalog);
            rendered.save(out)?;
            println!("Rendered sample {} with {} annotations to {}", id, set.len(), out);
        }
        Some("upload") => {
            let image_path = args.get(1).ok_or("usage: cardlabel upload <image> <labels.txt>")?;
            let label_path = args.get(2).ok_or("usage: cardlabel upload <image> <labels.txt>")?;

            let catalog = config.catalog();
            // Re-serialize through the catalog so an unresolved class id
            // fails here instead of corrupting the stored label file
            let shapes = cardlabel::format::read_label_file(Path::new(label_path), &catalog)?;
            let set = AnnotationSet::from_shapes(shapes);
            let label_text = cardlabel::format::serialize(&set, &catalog)?;

            let image_name = Path::new(image_path)
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or("image path has no file name")?;
            let image_bytes = std::fs::read(image_path)?;

            let id = client.create_sample(image_name, image_bytes, label_text)?;
            println!("Created sample {} with {} annotations", id, set.len());
        }
        Some("update") => {
            let id: u64 = args.get(1).ok_or("usage: cardlabel update <id> <labels.txt>")?.parse()?;
            let label_path = args.get(2).ok_or("usage: cardlabel update <id> <labels.txt>")?;

            let catalog = config.catalog();
            let shapes = cardlabel::format::read_label_file(Path::new(label_path), &catalog)?;
            let set = AnnotationSet::from_shapes(shapes);
            let label_text = cardlabel::format::serialize(&set, &catalog)?;

            client.update_sample(id, label_text)?;
            println!("Updated sample {} with {} annotations", id, set.len());
        }
        Some("delete") => {
            let id: u64 = args.get(1).ok_or("usage: cardlabel delete <id>")?.parse()?;
            client.delete_sample(id)?;
            println!("Deleted sample {}", id);
        }
        _ => {
            eprintln!(
                "usage: cardlabel <list [page] [size] | render <id> <out.png> | \
                 upload <image> <labels.txt> | update <id> <labels.txt> | delete <id>>"
            );
            std::process::exit(2);
        }
    }
    Ok(())
}

/// Load the label font if one is configured; rendering works without it.
fn load_font(config: &AppConfig) -> Option<FontArc> {
    let path = config.font_path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => match FontArc::try_from_vec(bytes) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Invalid font {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            log::warn!("Cannot read font {:?}: {}", path, e);
            None
        }
    }
}
