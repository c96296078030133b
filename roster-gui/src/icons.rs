use include_dir::{Dir, include_dir};
use iced::widget::{Svg, svg};

static ICONS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/icons");

const MISSING: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><rect x="3" y="3" width="18" height="18" fill="none" stroke="currentColor" stroke-width="2"/></svg>"#;

/// A bundled SVG icon by file stem, e.g. `icon("delete")`.
pub fn icon(name: &str) -> Svg<'static> {
    let bytes = ICONS
        .get_file(format!("{name}.svg"))
        .map_or(MISSING, |file| file.contents());

    svg(svg::Handle::from_memory(bytes)).width(20).height(20)
}
