//! # Drawables
//!
//! Loading and normalizing the vector images the visualizer traces.
//!
//! ## Responsibilities
//! - **Asset Access**: `DrawableLoader` resolves a drawable name to bytes.
//! - **Extraction**: pulls the root `viewBox` and the first `<path d="...">`
//!   out of an SVG document. Anything else in the document is ignored.
//! - **Normalization**: maps the viewBox onto a frame centered at the origin
//!   whose longer side spans `2 * half_extent`, with y pointing up.

use crate::error::{AssetParseError, EpicycleError, Result};
use kurbo::{Affine, BezPath, Rect};
use regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Resolves drawable names to raw bytes.
pub trait DrawableLoader: Send + Sync {
    fn load_bytes(&self, name: &str) -> std::io::Result<Vec<u8>>;
}

/// Reads drawables from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsDrawableLoader {
    pub root: PathBuf,
}

impl FsDrawableLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Names of every `.svg` file under the root, sorted.
    pub fn list(&self) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl DrawableLoader for FsDrawableLoader {
    fn load_bytes(&self, name: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }
}

/// A parsed drawable, already mapped into normalized path space.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub name: String,
    pub view_box: Rect,
    pub path: BezPath,
}

fn view_box_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"viewBox\s*=\s*["']([^"']*)["']"#).expect("valid viewBox pattern"))
}

fn path_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<path\b[^>]*>").expect("valid path element pattern"))
}

fn path_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\sd\s*=\s*["']([^"']*)["']"#).expect("valid path data pattern"))
}

/// Parses `"minX minY width height"`. Commas are accepted as separators.
pub fn parse_view_box(text: &str) -> Result<Rect, AssetParseError> {
    let malformed = || AssetParseError::MalformedViewBox(text.to_string());
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;

    let &[min_x, min_y, width, height] = values.as_slice() else {
        return Err(malformed());
    };
    if !(width > 0.0 && height > 0.0) || values.iter().any(|v| !v.is_finite()) {
        return Err(malformed());
    }
    Ok(Rect::new(min_x, min_y, min_x + width, min_y + height))
}

/// Affine mapping `view_box` into the centered, y-up normalized frame.
pub fn normalizing_transform(view_box: Rect, half_extent: f64) -> Affine {
    let scale = 2.0 * half_extent / view_box.width().max(view_box.height());
    let center = view_box.center();
    Affine::new([
        scale,
        0.0,
        0.0,
        -scale,
        -center.x * scale,
        center.y * scale,
    ])
}

impl Drawable {
    pub fn parse(name: &str, svg: &str, half_extent: f64) -> Result<Self, AssetParseError> {
        let view_box_text = view_box_regex()
            .captures(svg)
            .and_then(|caps| caps.get(1))
            .ok_or(AssetParseError::MissingViewBox)?
            .as_str();
        let view_box = parse_view_box(view_box_text)?;

        let element = path_element_regex()
            .find(svg)
            .ok_or(AssetParseError::MissingPath)?
            .as_str();
        let data = path_data_regex()
            .captures(element)
            .and_then(|caps| caps.get(1))
            .ok_or(AssetParseError::MissingPathData)?
            .as_str();

        let mut path = BezPath::from_svg(data)
            .map_err(|err| AssetParseError::MalformedPathData(err.to_string()))?;
        path.apply_affine(normalizing_transform(view_box, half_extent));

        Ok(Self {
            name: name.to_string(),
            view_box,
            path,
        })
    }
}

/// The ordered set of drawables a store can switch between.
#[derive(Clone)]
pub struct DrawableLibrary {
    pub loader: Arc<dyn DrawableLoader>,
    pub names: Vec<String>,
}

impl DrawableLibrary {
    pub fn new(loader: Arc<dyn DrawableLoader>, names: Vec<String>) -> Self {
        Self { loader, names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn load(&self, index: usize, half_extent: f64) -> Result<Drawable> {
        let name = self
            .names
            .get(index)
            .ok_or(EpicycleError::UnknownDrawable {
                index,
                available: self.names.len(),
            })?;
        let bytes = self
            .loader
            .load_bytes(name)
            .map_err(|err| EpicycleError::AssetLoad {
                name: name.clone(),
                message: err.to_string(),
            })?;
        let text = String::from_utf8_lossy(&bytes);
        Drawable::parse(name, &text, half_extent).map_err(|source| EpicycleError::AssetParse {
            name: name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100">
        <path fill="none" d="M 50 0 L 150 0 L 150 100 L 50 100 Z"/>
    </svg>"#;

    #[test]
    fn parses_view_box_with_mixed_separators() {
        let rect = parse_view_box("-10, 5 20 40").unwrap();
        assert_eq!(rect, Rect::new(-10.0, 5.0, 10.0, 45.0));
    }

    #[test]
    fn rejects_malformed_view_box() {
        assert!(matches!(
            parse_view_box("0 0 100"),
            Err(AssetParseError::MalformedViewBox(_))
        ));
        assert!(matches!(
            parse_view_box("0 0 abc 100"),
            Err(AssetParseError::MalformedViewBox(_))
        ));
        assert!(matches!(
            parse_view_box("0 0 0 100"),
            Err(AssetParseError::MalformedViewBox(_))
        ));
    }

    #[test]
    fn normalizes_longer_side_to_half_extent() {
        let drawable = Drawable::parse("square", SQUARE, 1.0).unwrap();
        let points: Vec<Point> = drawable
            .path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        // viewBox is 200 wide: x spans [-1, 1], y (100 tall) spans [-0.5, 0.5].
        assert!((points[0].x - -0.5).abs() < 1e-12);
        assert!((points[0].y - 0.5).abs() < 1e-12, "y axis must point up");
        assert!((points[2].x - 0.5).abs() < 1e-12);
        assert!((points[2].y - -0.5).abs() < 1e-12);
    }

    #[test]
    fn reports_missing_pieces() {
        let no_path = r#"<svg viewBox="0 0 10 10"><circle r="4"/></svg>"#;
        assert_eq!(
            Drawable::parse("x", no_path, 1.0).unwrap_err(),
            AssetParseError::MissingPath
        );

        let no_data = r#"<svg viewBox="0 0 10 10"><path fill="red"/></svg>"#;
        assert_eq!(
            Drawable::parse("x", no_data, 1.0).unwrap_err(),
            AssetParseError::MissingPathData
        );

        let no_view_box = r#"<svg><path d="M0 0 L1 1"/></svg>"#;
        assert_eq!(
            Drawable::parse("x", no_view_box, 1.0).unwrap_err(),
            AssetParseError::MissingViewBox
        );
    }

    #[test]
    fn rejects_garbage_path_data() {
        let bad = r#"<svg viewBox="0 0 10 10"><path d="M 0 0 Q"/></svg>"#;
        assert!(matches!(
            Drawable::parse("x", bad, 1.0),
            Err(AssetParseError::MalformedPathData(_))
        ));
    }

    #[test]
    fn fs_loader_lists_svg_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.svg"), SQUARE).unwrap();
        std::fs::write(dir.path().join("a.SVG"), SQUARE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let loader = FsDrawableLoader::new(dir.path());
        assert_eq!(loader.list().unwrap(), vec!["a.SVG", "b.svg"]);

        let library = DrawableLibrary::new(Arc::new(loader), vec!["b.svg".into()]);
        assert!(library.load(0, 1.0).is_ok());
        assert!(matches!(
            library.load(3, 1.0),
            Err(EpicycleError::UnknownDrawable { index: 3, .. })
        ));
    }
}
