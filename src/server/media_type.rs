use std::path::Path;

/// Wrapper over the media types the API answers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaType {
    /// Media Type: "text/plain".
    PlainText,
    /// Media Type: "text/html".
    Html,
    /// Media Type: "application/json".
    ApplicationJson,
    /// Media Type: "application/gzip".
    Gzip,
    /// Media Type: "application/x-xz".
    Xz,
    /// Media Type: "application/x-tar".
    Tar,
    /// Media Type: "application/x-iso9660-image".
    Iso,
    /// Media Type: "application/octet-stream".
    OctetStream,
}

impl Default for MediaType {
    /// Kernels and most initrd images carry no telling extension.
    fn default() -> Self {
        Self::OctetStream
    }
}

impl MediaType {
    /// Guess the media type of a file from its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixie_api::server::MediaType;
    ///
    /// assert_eq!(MediaType::from_path("boot/menu.ipxe"), MediaType::PlainText);
    /// assert_eq!(MediaType::from_path("images/vmlinuz"), MediaType::OctetStream);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Self::default(),
        };
        match ext.as_str() {
            "txt" | "ipxe" | "cfg" | "conf" | "sh" | "ks" | "preseed" => Self::PlainText,
            "html" | "htm" => Self::Html,
            "json" => Self::ApplicationJson,
            "gz" | "tgz" => Self::Gzip,
            "xz" => Self::Xz,
            "tar" => Self::Tar,
            "iso" => Self::Iso,
            _ => Self::default(),
        }
    }

    /// Returns a static string representation of the object.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::ApplicationJson => "application/json",
            Self::Gzip => "application/gzip",
            Self::Xz => "application/x-xz",
            Self::Tar => "application/x-tar",
            Self::Iso => "application/x-iso9660-image",
            Self::OctetStream => "application/octet-stream",
        }
    }
}
