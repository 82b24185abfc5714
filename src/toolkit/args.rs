//! Toolkit command-line flags
//!
//! The toolkit consumes its own flags from the process arguments and hands
//! the rest back untouched. Recognized flags:
//!
//! - `-geometry WxH+X+Y` - initial window position (size is set by the program)
//! - `-iconic` - start minimized
//! - `-gldebug` - enable backend validation
//! - `-display NAME`, `-sync` - accepted for compatibility, ignored
//! - `-direct` / `-indirect` - accepted; mutually exclusive

use super::ToolkitError;

/// Parsed `-geometry` value; every part is optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub size: Option<(u32, u32)>,
    pub position: Option<(i32, i32)>,
}

impl Geometry {
    /// Parse an X11-style geometry string: `[WxH][{+-}X{+-}Y]`
    pub fn parse(spec: &str) -> Result<Self, ToolkitError> {
        let invalid = || ToolkitError::InvalidGeometry(spec.to_string());
        let spec_body = spec.strip_prefix('=').unwrap_or(spec);

        let offset_start = spec_body.find(['+', '-']).unwrap_or(spec_body.len());
        let (size_part, offset_part) = spec_body.split_at(offset_start);

        let size = if size_part.is_empty() {
            None
        } else {
            let (w, h) = size_part
                .split_once(['x', 'X'])
                .ok_or_else(invalid)?;
            let w = w.parse::<u32>().map_err(|_| invalid())?;
            let h = h.parse::<u32>().map_err(|_| invalid())?;
            Some((w, h))
        };

        let position = if offset_part.is_empty() {
            None
        } else {
            // Second sign starts the y offset
            let y_start = offset_part[1..]
                .find(['+', '-'])
                .map(|i| i + 1)
                .ok_or_else(invalid)?;
            let (x, y) = offset_part.split_at(y_start);
            let x = parse_offset(x).ok_or_else(invalid)?;
            let y = parse_offset(y).ok_or_else(invalid)?;
            Some((x, y))
        };

        if size.is_none() && position.is_none() {
            return Err(invalid());
        }

        Ok(Self { size, position })
    }
}

/// Parse `+N` or `-N`
fn parse_offset(s: &str) -> Option<i32> {
    let (sign, digits) = s.split_at(1);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i32 = digits.parse().ok()?;
    match sign {
        "+" => Some(value),
        "-" => Some(-value),
        _ => None,
    }
}

/// Options gathered from toolkit flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolkitOptions {
    pub geometry: Option<Geometry>,
    pub iconic: bool,
    pub gl_debug: bool,
}

impl ToolkitOptions {
    /// Window position from `-geometry`, if usable
    ///
    /// Negative offsets count from the far screen edge, which the toolkit
    /// does not support; they are ignored.
    pub fn initial_position(&self) -> Option<(i32, i32)> {
        let (x, y) = self.geometry?.position?;
        if x < 0 || y < 0 {
            log::warn!("Ignoring negative -geometry offset ({}, {})", x, y);
            return None;
        }
        Some((x, y))
    }
}

/// Consume toolkit flags from `args`, returning the options and the
/// remaining arguments. The first argument (program name) is always kept.
pub fn parse_args<I>(args: I) -> Result<(ToolkitOptions, Vec<String>), ToolkitError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = ToolkitOptions::default();
    let mut remaining = Vec::new();
    let mut direct = false;
    let mut indirect = false;

    let mut iter = args.into_iter();
    if let Some(program) = iter.next() {
        remaining.push(program);
    }

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-geometry" => {
                let value = iter.next().ok_or(ToolkitError::MissingFlagValue("-geometry"))?;
                options.geometry = Some(Geometry::parse(&value)?);
            }
            "-display" => {
                let value = iter.next().ok_or(ToolkitError::MissingFlagValue("-display"))?;
                log::warn!("Ignoring -display {}: display is selected from the environment", value);
            }
            "-iconic" => options.iconic = true,
            "-gldebug" => options.gl_debug = true,
            "-direct" => direct = true,
            "-indirect" => indirect = true,
            "-sync" => log::debug!("Ignoring -sync"),
            _ => remaining.push(arg),
        }
    }

    if direct && indirect {
        return Err(ToolkitError::AmbiguousRendering);
    }

    Ok((options, remaining))
}
