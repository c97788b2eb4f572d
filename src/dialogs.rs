// Native, blocking dialogs. They run on the UI thread like everything else.

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;

use crate::config::DEFAULT_SAVE_NAME;
use crate::loader::IMAGE_EXTENSIONS;
use crate::shell::{Notice, NoticeLevel};

// A "*" filter turns into "*.*" on the GTK and portal backends and hides
// extensionless files, so there is no explicit all-files entry.
const OPEN_FILTERS: [(&str, &[&str]); 1] = [("Resim Dosyaları", &IMAGE_EXTENSIONS)];

pub fn pick_image() -> Option<PathBuf> {
    OPEN_FILTERS
        .iter()
        .fold(FileDialog::new().set_title("Resim Seç"), |dialog, (name, exts)| {
            dialog.add_filter(*name, *exts)
        })
        .pick_file()
}

pub fn pick_save_path() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Resmi Kaydet")
        .set_file_name(DEFAULT_SAVE_NAME)
        .add_filter("JPG Files", &["jpg"])
        .add_filter("PNG Files", &["png"])
        .save_file()
}

pub fn show(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => MessageLevel::Info,
        NoticeLevel::Warning => MessageLevel::Warning,
        NoticeLevel::Error => MessageLevel::Error,
    };
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(notice.title.as_str())
        .set_description(notice.message.as_str())
        .set_buttons(MessageButtons::Ok)
        .show();
}
