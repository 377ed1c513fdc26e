//! Interactive display of inspection results.
//!
//! Each entry point runs its own event loop and blocks until the window is
//! closed or the frames run out. Only one may be called per process.

mod app;
mod message;
mod source;

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::DynamicImage;

pub use app::ReviewApp;
pub use message::Message;
pub use source::{FrameSource, InspectorSource, Panel, SingleImageSource};

use crate::inspect::Inspector;

/// Run the review window until `source` is exhausted
pub fn run<S: FrameSource>(source: S, title: impl Into<String>) -> Result<()> {
    let title = title.into();
    iced::application(
        move || ReviewApp::boot(source.clone(), title.clone()),
        ReviewApp::<S>::update,
        ReviewApp::<S>::view,
    )
    .title(ReviewApp::<S>::title)
    .subscription(ReviewApp::<S>::subscription)
    .run()
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

/// Show one image in an untitled window until a key is pressed
pub fn show_image(image: DynamicImage) -> Result<()> {
    run(SingleImageSource::new(image), "")
}

/// Step through every file of the inspector, one keypress per file
pub fn review(inspector: Inspector) -> Result<()> {
    run(InspectorSource::new(inspector), "bgline")
}

/// Ask for an image file with the native file dialog
pub fn pick_image(start_dir: &Path) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose image file...")
        .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tif", "tiff"])
        .set_directory(start_dir)
        .pick_file()
}
