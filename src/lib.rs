pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod mask;
pub mod picker;
pub mod state;

use std::path::Path;
use std::rc::Rc;

pub use config::{load_picker_config, OutputSize, PickerConfiguration};
pub use editor::{CropSession, Drawing, ImageopsDrawing};
pub use error::{AppError, AppResult};
pub use geometry::Rect;
pub use mask::{EditorType, MaskShape};
pub use picker::{EditorHandle, PickerController, PickerOutcome};

/// Runs one crop session over `input` at its initial viewport inside
/// `container` and writes the committed image to `output`.
///
/// Returns the dimensions of the written image.
pub fn crop_image_file(
    config: &PickerConfiguration,
    input: &Path,
    output: &Path,
    container: Rect,
) -> AppResult<(u32, u32)> {
    config.validate()?;
    if !config.editor_type.allows_editing() {
        return Err(AppError::EditingDisabled {
            editor: config.editor_type.label(),
        });
    }

    let source = image::open(input)?.to_rgba8();
    tracing::debug!(
        path = %input.display(),
        width = source.width(),
        height = source.height(),
        "loaded source image"
    );
    let shape = MaskShape::for_editor(
        config.editor_type,
        config.image_editor.hole_padding,
        config.output_size.as_size(),
        config.grid_divisions,
    );
    let mut session = CropSession::new(
        source,
        shape,
        config.output_size,
        Rc::new(ImageopsDrawing::default()),
    );
    session.enter(container)?;
    let cropped = session.commit()?;
    cropped.save(output)?;

    tracing::info!(path = %output.display(), "wrote cropped image");
    Ok(cropped.dimensions())
}
