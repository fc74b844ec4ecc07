use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use lightpick::geometry::Rect;
use lightpick::{crop_image_file, load_picker_config, logging, EditorType};

const USAGE: &str = "usage: lightpick <input> <output> [profile|image]";
/// Portrait phone-sized editor container, in points.
const DEMO_CONTAINER: Rect = Rect::new(0.0, 0.0, 375.0, 667.0);

fn parse_editor_type(raw: &str) -> Result<EditorType> {
    match raw {
        "profile" => Ok(EditorType::Profile),
        "image" => Ok(EditorType::Image),
        other => bail!("unknown editor type `{other}`\n{USAGE}"),
    }
}

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };
    let (input, output) = (PathBuf::from(input), PathBuf::from(output));

    let mut config = load_picker_config();
    if let Some(raw) = args.next() {
        config.editor_type = parse_editor_type(&raw.to_string_lossy())?;
    }

    let (width, height) = crop_image_file(&config, &input, &output, DEMO_CONTAINER)
        .with_context(|| format!("failed to crop {}", input.display()))?;
    tracing::info!(
        editor = config.editor_type.label(),
        width,
        height,
        "done"
    );
    Ok(())
}
