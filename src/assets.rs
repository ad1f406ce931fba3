use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Asset;

pub fn get_asset_bytes(name: &str) -> Option<Cow<'static, [u8]>> {
    Asset::get(name).map(|f| f.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_templates_are_embedded() {
        for name in ["default", "basic", "pid", "advanced"] {
            let path = format!("programs/{}.ino", name);
            assert!(get_asset_bytes(&path).is_some(), "missing {}", path);
        }
        assert!(get_asset_bytes("programs/nope.ino").is_none());
    }
}
