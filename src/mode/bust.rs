//! Cache busting.
//!
//! The sprite's file name gets a short content hash, so a changed sprite is
//! always fetched again: `svg/sprite.css.svg` -> `svg/sprite.css-1a2b3c4d.svg`.

/// First 4 bytes of the `blake3` hash, hex encoded (8 chars).
pub fn content_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hex::encode(&hash.as_bytes()[..4])
}

/// Insert `-{hash}` before the extension of the file name.
pub fn busted_path(path: &str, hash: &str) -> String {
    let (dir, file) = match path.rfind('/') {
        Some(slash) => path.split_at(slash + 1),
        None => ("", path),
    };
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}-{hash}{}", &file[..dot], &file[dot..]),
        _ => format!("{path}-{hash}"),
    }
}
