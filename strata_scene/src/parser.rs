use std::path::Path;

use strata_io::FileSystem;

use crate::error::{LoadError, ParseError};
use crate::instance::{Instance, InstanceIndex, SceneValue, StructValue};
use crate::matchers::{
    HEADER_RE, KEY_RE, METADATA_RE, STRUCT_ENTRY_RE, STRUCT_OPEN_RE, VALUE_CASCADE, match_value,
    skip_separator,
};

/// Line-oriented reader for scene documents.
///
/// Each header line opens an [`Instance`]; following lines add attributes
/// to it until the next header. Brace structs may span several lines.
pub struct Parser<'a> {
    src: &'a str,
    file: String,
    index: InstanceIndex,
    current: Option<Instance>,
    /// Open struct and the line it was opened on.
    open_struct: Option<(StructValue, usize)>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, file: impl Into<String>) -> Self {
        Self {
            src,
            file: file.into(),
            index: InstanceIndex::new(),
            current: None,
            open_struct: None,
        }
    }

    pub fn parse(mut self) -> Result<InstanceIndex, ParseError> {
        let src = self.src;
        for (i, raw) in src.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if self.open_struct.is_none() {
                if let Some(caps) = HEADER_RE.captures(line) {
                    self.finalize_instance();
                    self.current = Some(Instance::new(&caps[1]));
                    let attributes = caps.get(2).map_or("", |m| m.as_str());
                    self.parse_attributes(attributes, line_no)?;
                    continue;
                }
            }

            if self.current.is_none() {
                return Err(ParseError::OrphanAttribute {
                    file: self.file.clone(),
                    line: line_no,
                });
            }
            self.parse_attributes(line, line_no)?;
        }

        if let Some((open, line)) = self.open_struct.take() {
            return Err(ParseError::UnclosedStruct {
                file: self.file,
                line,
                name: open.name,
            });
        }

        self.finalize_instance();
        Ok(self.index)
    }

    fn finalize_instance(&mut self) {
        if let Some(instance) = self.current.take() {
            self.index
                .entry(instance.ty.clone())
                .or_default()
                .push(instance);
        }
    }

    fn instance_mut(&mut self, line: usize) -> Result<&mut Instance, ParseError> {
        match self.current.as_mut() {
            Some(instance) => Ok(instance),
            None => Err(ParseError::OrphanAttribute {
                file: self.file.clone(),
                line,
            }),
        }
    }

    fn unrecognized(&self, text: &str, line: usize) -> ParseError {
        ParseError::Unrecognized {
            file: self.file.clone(),
            line,
            text: text.to_string(),
        }
    }
}

// -------------------- Attribute lists --------------------

impl<'a> Parser<'a> {
    fn parse_attributes(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        let mut rest = text.trim();
        while !rest.is_empty() {
            rest = if self.open_struct.is_some() || STRUCT_OPEN_RE.is_match(rest) {
                self.parse_struct(rest, line)?
            } else {
                self.parse_entry(rest, line)?
            };
        }
        Ok(())
    }

    /// One `key = value` pair (or a discarded metadata pair); returns what is left.
    fn parse_entry<'t>(&mut self, text: &'t str, line: usize) -> Result<&'t str, ParseError> {
        if let Some(caps) = KEY_RE.captures(text) {
            let key = caps[1].to_string();
            let value_text = &text[caps.get(0).map_or(0, |m| m.end())..];
            let (len, value) =
                match_value(value_text, VALUE_CASCADE).ok_or_else(|| self.unrecognized(text, line))?;
            self.instance_mut(line)?.attributes.insert(key, value);
            return Ok(skip_separator(&value_text[len..]));
        }

        if let Some(m) = METADATA_RE.find(text) {
            let value_text = &text[m.end()..];
            let (len, _) =
                match_value(value_text, VALUE_CASCADE).ok_or_else(|| self.unrecognized(text, line))?;
            log::debug!("{}:{line}: skipping `{}`", self.file, m.as_str().trim_end());
            return Ok(skip_separator(&value_text[len..]));
        }

        Err(self.unrecognized(text, line))
    }

    /// Opens a struct if needed, then consumes entries until `}` or end of text.
    fn parse_struct<'t>(&mut self, text: &'t str, line: usize) -> Result<&'t str, ParseError> {
        let mut rest = text;
        if self.open_struct.is_none() {
            let caps = STRUCT_OPEN_RE
                .captures(rest)
                .ok_or_else(|| self.unrecognized(text, line))?;
            let open = StructValue {
                name: caps[1].to_string(),
                ..StructValue::default()
            };
            rest = &rest[caps.get(0).map_or(0, |m| m.end())..];
            self.open_struct = Some((open, line));
        }

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                return Ok(rest);
            }

            if let Some(after) = rest.strip_prefix('}') {
                if let Some((closed, _)) = self.open_struct.take() {
                    let name = closed.name.clone();
                    self.instance_mut(line)?
                        .attributes
                        .insert(name, SceneValue::Struct(closed));
                }
                return Ok(skip_separator(after));
            }

            let entry = rest.strip_suffix(',').unwrap_or(rest);
            let caps = STRUCT_ENTRY_RE
                .captures(entry)
                .ok_or_else(|| self.unrecognized(rest, line))?;
            let key = caps[1].to_string();
            let value_text = &entry[caps.get(0).map_or(0, |m| m.end())..];
            let (len, value) =
                match_value(value_text, VALUE_CASCADE).ok_or_else(|| self.unrecognized(rest, line))?;
            if let Some((open, _)) = self.open_struct.as_mut() {
                open.fields.insert(key, value);
            }
            rest = skip_separator(&value_text[len..]);
        }
    }
}

// -------------------- Entry points --------------------

/// Parses a whole document. Failures are logged before they are returned.
pub fn parse_scene(src: &str, file_name: &str) -> Result<InstanceIndex, ParseError> {
    Parser::new(src, file_name)
        .parse()
        .inspect_err(|err| log::error!("scene parse failed: {err}"))
}

pub fn load_scene(fs: &dyn FileSystem, path: &Path) -> Result<InstanceIndex, LoadError> {
    let src = fs.read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_scene(&src, &path.display().to_string())?)
}
