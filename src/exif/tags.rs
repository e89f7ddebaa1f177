use exif::{Context, Tag};

/// Pointer tags that link IFD0 to its sub-IFDs. They carry offsets, not metadata.
const POINTER_TAGS: [Tag; 3] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
];

/// Resolve a tag to its human-readable name, using the GPS table for GPS tags.
pub fn tag_name(tag: Tag) -> String {
    match tag.context() {
        Context::Gps => gps_tag_name(tag.number()),
        context => standard_tag_name(context, tag.number()),
    }
}

/// Name from the standard TIFF/Exif/Interop table, or the decimal id if unknown.
pub fn standard_tag_name(context: Context, number: u16) -> String {
    lookup(Tag(context, number))
}

/// Name from the GPS table, or the decimal id if unknown.
pub fn gps_tag_name(number: u16) -> String {
    lookup(Tag(Context::Gps, number))
}

/// `true` for the structural sub-IFD pointer tags.
pub fn is_pointer(tag: Tag) -> bool {
    POINTER_TAGS.contains(&tag)
}

fn lookup(tag: Tag) -> String {
    // Unknown tags display as "Tag(Context, n)"; only known ones have a description.
    if tag.description().is_some() {
        tag.to_string()
    } else {
        tag.number().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_standard_tags() {
        assert_eq!(tag_name(Tag::Make), "Make");
        assert_eq!(tag_name(Tag::Model), "Model");
        assert_eq!(tag_name(Tag::DateTimeOriginal), "DateTimeOriginal");
        assert_eq!(standard_tag_name(Context::Tiff, 0x010F), "Make");
    }

    #[test]
    fn known_gps_tags() {
        assert_eq!(gps_tag_name(0x0001), "GPSLatitudeRef");
        assert_eq!(gps_tag_name(0x0002), "GPSLatitude");
        assert_eq!(tag_name(Tag::GPSLongitude), "GPSLongitude");
    }

    #[test]
    fn gps_and_standard_tables_are_separate() {
        // 0x0002 is GPSLatitude only in the GPS table.
        assert_eq!(standard_tag_name(Context::Tiff, 0x0002), "2");
        assert_eq!(gps_tag_name(0x0002), "GPSLatitude");
    }

    #[test]
    fn unknown_tags_fall_back_to_numeric_id() {
        assert_eq!(standard_tag_name(Context::Tiff, 0xBEEF), "48879");
        assert_eq!(standard_tag_name(Context::Exif, 0xBEEF), "48879");
        assert_eq!(gps_tag_name(0x7FFF), "32767");
        assert_eq!(tag_name(Tag(Context::Exif, 0xBEEF)), "48879");
    }

    #[test]
    fn pointer_tags() {
        assert!(is_pointer(Tag::ExifIFDPointer));
        assert!(is_pointer(Tag::GPSInfoIFDPointer));
        assert!(is_pointer(Tag::InteropIFDPointer));
        assert!(!is_pointer(Tag::Make));
    }
}
