use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt};
use depthcloud_core::{unpack_rgb, Colors, PointCloud};
use log::{debug, warn};

use super::error::{PcdError, Result};
use super::header::{DataMode, FieldKind, PcdField, PcdHeader, PcdVersion, IDENTITY_VIEWPOINT};

/// Reads a PCD file, ascii or binary.
pub fn read_pcd(path: impl AsRef<Path>) -> Result<PointCloud> {
    read_pcd_with_header(path).map(|(_, cloud)| cloud)
}

/// Reads a PCD file and also returns the header it declared.
pub fn read_pcd_with_header(path: impl AsRef<Path>) -> Result<(PcdHeader, PointCloud)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (header, cloud) = Parser::new(BufReader::new(file)).parse()?;
    debug!(
        "read {} points ({}) from {}",
        cloud.len(),
        header.data_mode(),
        path.display()
    );
    Ok((header, cloud))
}

/// Reads only the header of a PCD file.
pub fn read_pcd_header(path: impl AsRef<Path>) -> Result<PcdHeader> {
    let file = File::open(path)?;
    Parser::new(BufReader::new(file)).parse_header()
}

/// Parses a PCD document from any reader.
pub fn read_pcd_from<R: Read>(r: R) -> Result<(PcdHeader, PointCloud)> {
    Parser::new(BufReader::new(r)).parse()
}

/// What a decoded value is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    X,
    Y,
    Z,
    PackedRgb,
    R,
    G,
    B,
    Skip,
}

/// One decoded element, before it is routed to its slot.
#[derive(Debug, Clone, Copy)]
enum Value {
    Unsigned(u64),
    Signed(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    fn parse(kind: FieldKind, token: &str) -> std::result::Result<Self, String> {
        fn num<T: FromStr>(token: &str) -> std::result::Result<T, String>
        where
            T::Err: std::fmt::Display,
        {
            token
                .parse::<T>()
                .map_err(|e| format!("cannot parse {token:?}: {e}"))
        }

        Ok(match kind {
            FieldKind::U8 => Value::Unsigned(num::<u8>(token)?.into()),
            FieldKind::U16 => Value::Unsigned(num::<u16>(token)?.into()),
            FieldKind::U32 => Value::Unsigned(num::<u32>(token)?.into()),
            FieldKind::I8 => Value::Signed(num::<i8>(token)?.into()),
            FieldKind::I16 => Value::Signed(num::<i16>(token)?.into()),
            FieldKind::I32 => Value::Signed(num::<i32>(token)?.into()),
            FieldKind::F32 => Value::F32(num::<f32>(token)?),
            FieldKind::F64 => Value::F64(num::<f64>(token)?),
        })
    }

    fn read<R: Read>(kind: FieldKind, r: &mut R) -> std::io::Result<Self> {
        Ok(match kind {
            FieldKind::U8 => Value::Unsigned(r.read_u8()?.into()),
            FieldKind::U16 => Value::Unsigned(r.read_u16::<LittleEndian>()?.into()),
            FieldKind::U32 => Value::Unsigned(r.read_u32::<LittleEndian>()?.into()),
            FieldKind::I8 => Value::Signed(r.read_i8()?.into()),
            FieldKind::I16 => Value::Signed(r.read_i16::<LittleEndian>()?.into()),
            FieldKind::I32 => Value::Signed(r.read_i32::<LittleEndian>()?.into()),
            FieldKind::F32 => Value::F32(r.read_f32::<LittleEndian>()?),
            FieldKind::F64 => Value::F64(r.read_f64::<LittleEndian>()?),
        })
    }

    fn as_f32(self) -> f32 {
        match self {
            Value::Unsigned(v) => v as f32,
            Value::Signed(v) => v as f32,
            Value::F32(v) => v,
            Value::F64(v) => v as f32,
        }
    }

    /// PCL stores `rgb` as a float whose bit pattern is `0x00RRGGBB`.
    fn as_packed_rgb(self) -> u32 {
        match self {
            Value::Unsigned(v) => v as u32,
            Value::Signed(v) => v as u32,
            Value::F32(v) => v.to_bits(),
            Value::F64(v) => (v as f32).to_bits(),
        }
    }

    fn as_channel(self) -> u8 {
        match self {
            Value::Unsigned(v) => v.min(255) as u8,
            Value::Signed(v) => v.clamp(0, 255) as u8,
            Value::F32(v) => v as u8,
            Value::F64(v) => v as u8,
        }
    }
}

/// Routing for one declared field. Only its first element is kept; the
/// remaining `count - 1` are read past.
#[derive(Debug, Clone, Copy)]
struct FieldSlot {
    kind: FieldKind,
    slot: Slot,
    count: u64,
}

/// Accumulates decoded points column by column.
struct CloudBuilder {
    slots: Vec<FieldSlot>,
    colored: bool,
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    colors: Colors,
    rgb: [u8; 3],
}

impl CloudBuilder {
    fn new(header: &PcdHeader) -> Result<Self> {
        let has = |name: &str| header.field(name).is_some();
        for axis in ["x", "y", "z"] {
            if !has(axis) {
                return Err(PcdError::format(
                    "FIELDS",
                    format!("required field `{axis}` is missing"),
                    "",
                ));
            }
        }

        let packed = ["rgb", "rgba"].into_iter().find(|&n| has(n));
        let channels = has("r") && has("g") && has("b");

        let mut slots = Vec::with_capacity(header.fields().len());
        for field in header.fields() {
            let slot = match field.name() {
                "x" => Slot::X,
                "y" => Slot::Y,
                "z" => Slot::Z,
                name if Some(name) == packed => Slot::PackedRgb,
                "r" if packed.is_none() && channels => Slot::R,
                "g" if packed.is_none() && channels => Slot::G,
                "b" if packed.is_none() && channels => Slot::B,
                _ => Slot::Skip,
            };
            slots.push(FieldSlot {
                kind: field.kind(),
                slot,
                count: field.count(),
            });
        }

        // Capacity is only a hint; a lying POINTS line must not trigger a huge allocation.
        let cap = header.points().min(1 << 20) as usize;
        Ok(Self {
            slots,
            colored: packed.is_some() || channels,
            x: Vec::with_capacity(cap),
            y: Vec::with_capacity(cap),
            z: Vec::with_capacity(cap),
            colors: Colors::with_capacity(if packed.is_some() || channels { cap } else { 0 }),
            rgb: [0; 3],
        })
    }

    fn put(&mut self, slot: Slot, value: Value) {
        match slot {
            Slot::X => self.x.push(value.as_f32()),
            Slot::Y => self.y.push(value.as_f32()),
            Slot::Z => self.z.push(value.as_f32()),
            Slot::PackedRgb => self.rgb = unpack_rgb(value.as_packed_rgb()),
            Slot::R => self.rgb[0] = value.as_channel(),
            Slot::G => self.rgb[1] = value.as_channel(),
            Slot::B => self.rgb[2] = value.as_channel(),
            Slot::Skip => {}
        }
    }

    fn finish_point(&mut self) {
        if self.colored {
            self.colors.push(self.rgb);
            self.rgb = [0; 3];
        }
    }

    fn build(self) -> PointCloud {
        PointCloud {
            x: self.x,
            y: self.y,
            z: self.z,
            colors: self.colored.then_some(self.colors),
        }
    }
}

struct Parser<R: BufRead> {
    reader: R,
    /// Current header line, for error messages.
    line: String,
    declared_dense: Option<bool>,
}

impl<R: BufRead> Parser<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            declared_dense: None,
        }
    }

    fn parse(mut self) -> Result<(PcdHeader, PointCloud)> {
        let mut header = self.parse_header()?;
        let cloud = match header.data_mode() {
            DataMode::Ascii => self.parse_ascii_data(&header)?,
            DataMode::Binary => self.parse_binary_data(&header)?,
        };

        let dense = cloud.is_dense();
        match self.declared_dense {
            Some(true) if !dense => {
                warn!("PCD header declares DENSE 1 but the body holds non-finite points");
            }
            None => header.dense = dense,
            _ => {}
        }

        Ok((header, cloud))
    }

    /// Parses header lines up to and including `DATA`. Keywords may come in
    /// any order; only `VERSION`, `FIELDS`, `SIZE`, `TYPE` and `DATA` are
    /// mandatory.
    fn parse_header(&mut self) -> Result<PcdHeader> {
        let mut version = None;
        let mut names: Option<Vec<String>> = None;
        let mut sizes: Option<Vec<u8>> = None;
        let mut types: Option<Vec<char>> = None;
        let mut counts: Option<Vec<u64>> = None;
        let mut width = None;
        let mut height = None;
        let mut viewpoint = None;
        let mut points = None;

        let data = loop {
            if !self.next_line()? {
                return Err(PcdError::format(
                    "DATA",
                    "header ended before the DATA line",
                    "",
                ));
            }

            let line = self.line.as_str();
            let (keyword, rest) = line
                .split_once(char::is_whitespace)
                .map(|(k, r)| (k, r.trim()))
                .unwrap_or((line, ""));

            match keyword {
                "VERSION" => {
                    version = Some(
                        rest.parse::<PcdVersion>()
                            .map_err(|e| PcdError::format("VERSION", e, line))?,
                    )
                }
                "FIELDS" => names = Some(rest.split_whitespace().map(String::from).collect()),
                "SIZE" => sizes = Some(parse_list("SIZE", rest, line)?),
                "TYPE" => types = Some(parse_list("TYPE", rest, line)?),
                "COUNT" => counts = Some(parse_list("COUNT", rest, line)?),
                "WIDTH" => width = Some(parse_scalar::<u64>("WIDTH", rest, line)?),
                "HEIGHT" => height = Some(parse_scalar::<u64>("HEIGHT", rest, line)?),
                "POINTS" => points = Some(parse_scalar::<u64>("POINTS", rest, line)?),
                "VIEWPOINT" => {
                    let values: Vec<f32> = parse_list("VIEWPOINT", rest, line)?;
                    let array: [f32; 7] = values.try_into().map_err(|v: Vec<f32>| {
                        PcdError::format(
                            "VIEWPOINT",
                            format!("expected 7 values, got {}", v.len()),
                            line,
                        )
                    })?;
                    viewpoint = Some(array);
                }
                "DENSE" => {
                    self.declared_dense = Some(match rest {
                        "1" | "true" => true,
                        "0" | "false" => false,
                        _ => return Err(PcdError::format("DENSE", "expected 0 or 1", line)),
                    })
                }
                "DATA" => {
                    break rest
                        .parse::<DataMode>()
                        .map_err(|e| PcdError::format("DATA", e, line))?
                }
                other => warn!("ignoring unknown PCD header keyword {other:?}"),
            }
        };

        let version =
            version.ok_or_else(|| PcdError::format("VERSION", "VERSION line is missing", ""))?;
        let fields = self.assemble_fields(names, sizes, types, counts)?;

        let points = match (points, width, height) {
            (Some(p), _, _) => p,
            (None, Some(w), h) => w.saturating_mul(h.unwrap_or(1)),
            (None, None, _) => {
                return Err(PcdError::format("POINTS", "neither POINTS nor WIDTH given", ""))
            }
        };
        let width = width.unwrap_or(points);
        let height = height.unwrap_or(1);
        if width.checked_mul(height) != Some(points) {
            return Err(PcdError::format(
                "POINTS",
                format!("WIDTH {width} x HEIGHT {height} does not equal POINTS {points}"),
                "",
            ));
        }

        if self.declared_dense.is_none() {
            debug!("PCD header has no DENSE line");
        }

        Ok(PcdHeader {
            version,
            fields,
            width,
            height,
            viewpoint: viewpoint.unwrap_or(IDENTITY_VIEWPOINT),
            points,
            dense: self.declared_dense.unwrap_or(false),
            data,
        })
    }

    fn assemble_fields(
        &self,
        names: Option<Vec<String>>,
        sizes: Option<Vec<u8>>,
        types: Option<Vec<char>>,
        counts: Option<Vec<u64>>,
    ) -> Result<Vec<PcdField>> {
        let names = names.ok_or_else(|| PcdError::format("FIELDS", "FIELDS line is missing", ""))?;
        let sizes = sizes.ok_or_else(|| PcdError::format("SIZE", "SIZE line is missing", ""))?;
        let types = types.ok_or_else(|| PcdError::format("TYPE", "TYPE line is missing", ""))?;
        let counts = counts.unwrap_or_else(|| vec![1; names.len()]);

        for (section, len) in [("SIZE", sizes.len()), ("TYPE", types.len()), ("COUNT", counts.len())] {
            if len != names.len() {
                return Err(PcdError::format(
                    section,
                    format!("expected {} entries, got {len}", names.len()),
                    "",
                ));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(PcdError::format(
                    "FIELDS",
                    format!("duplicate field `{name}`"),
                    "",
                ));
            }
        }

        let fields = names
            .into_iter()
            .zip(sizes)
            .zip(types)
            .zip(counts)
            .map(|(((name, size), type_code), count)| {
                if count == 0 {
                    return Err(PcdError::format(
                        "COUNT",
                        format!("field `{name}` has a count of 0"),
                        "",
                    ));
                }
                let kind = FieldKind::from_size_and_type(size, type_code)
                    .map_err(|e| PcdError::format("TYPE", e, ""))?;
                Ok(PcdField::new(name, kind, count))
            })
            .collect::<Result<Vec<_>>>()?;

        // Every later size computation relies on this sum fitting in a u64.
        let mut record_size = 0u64;
        for field in &fields {
            record_size = field
                .count()
                .checked_mul(u64::from(field.kind().size()))
                .and_then(|bytes| record_size.checked_add(bytes))
                .ok_or_else(|| {
                    PcdError::format(
                        "COUNT",
                        format!("field `{}` makes the record size overflow", field.name()),
                        "",
                    )
                })?;
        }

        Ok(fields)
    }

    fn parse_ascii_data(&mut self, header: &PcdHeader) -> Result<PointCloud> {
        let mut builder = CloudBuilder::new(header)?;
        let slots = builder.slots.clone();
        let mut buf = Vec::new();
        let mut read = 0u64;

        while read < header.points() {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Err(PcdError::TruncatedData {
                    expected: header.points(),
                    found: read,
                    unit: "points",
                });
            }
            let line = std::str::from_utf8(&buf)
                .map_err(|e| PcdError::format("data", e.to_string(), ""))?
                .trim();
            if line.is_empty() {
                continue;
            }

            let expected = header.values_per_point();
            let found = line.split_whitespace().count();
            if found as u64 != expected {
                return Err(PcdError::format(
                    "data",
                    format!("expected {expected} values, got {found}"),
                    line,
                ));
            }

            let mut tokens = line.split_whitespace();
            for field in &slots {
                // `count` is bounded by the token count checked above.
                for (i, token) in tokens.by_ref().take(field.count as usize).enumerate() {
                    let value = Value::parse(field.kind, token)
                        .map_err(|e| PcdError::format("data", e, line))?;
                    if i == 0 {
                        builder.put(field.slot, value);
                    }
                }
            }
            builder.finish_point();
            read += 1;
        }

        Ok(builder.build())
    }

    fn parse_binary_data(&mut self, header: &PcdHeader) -> Result<PointCloud> {
        let mut builder = CloudBuilder::new(header)?;
        let slots = builder.slots.clone();
        let expected = header
            .body_size()
            .ok_or_else(|| PcdError::format("POINTS", "body size overflows", ""))?;

        let mut body = Vec::new();
        (&mut self.reader).take(expected).read_to_end(&mut body)?;
        if (body.len() as u64) < expected {
            return Err(PcdError::TruncatedData {
                expected,
                found: body.len() as u64,
                unit: "bytes",
            });
        }

        let mut cursor = Cursor::new(body.as_slice());
        for _ in 0..header.points() {
            for field in &slots {
                builder.put(field.slot, Value::read(field.kind, &mut cursor)?);
                let rest = (field.count - 1) * u64::from(field.kind.size());
                cursor.set_position(cursor.position() + rest);
            }
            builder.finish_point();
        }

        Ok(builder.build())
    }

    /// Loads the next non-blank, non-comment line into `self.line`.
    /// Returns `false` at end of input.
    fn next_line(&mut self) -> Result<bool> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(false);
            }
            let text = std::str::from_utf8(&buf)
                .map_err(|_| PcdError::format("header", "header line is not valid UTF-8", ""))?
                .trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            self.line.clear();
            self.line.push_str(text);
            return Ok(true);
        }
    }
}

fn parse_list<T>(section: &str, rest: &str, line: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    rest.split_whitespace()
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| PcdError::format(section, format!("{s:?}: {e}"), line))
        })
        .collect()
}

fn parse_scalar<T>(section: &str, rest: &str, line: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    rest.parse::<T>()
        .map_err(|e| PcdError::format(section, format!("{rest:?}: {e}"), line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use depthcloud_core::pack_rgb;

    const XYZ_HEADER: &str = "VERSION 0.7\n\
        FIELDS x y z\n\
        SIZE 4 4 4\n\
        TYPE F F F\n\
        COUNT 1 1 1\n\
        WIDTH 2\n\
        HEIGHT 1\n\
        VIEWPOINT 0 0 0 1 0 0 0\n\
        POINTS 2\n";

    fn parse_str(s: &str) -> Result<(PcdHeader, PointCloud)> {
        read_pcd_from(s.as_bytes())
    }

    fn header_of(s: &str) -> Result<PcdHeader> {
        Parser::new(BufReader::new(s.as_bytes())).parse_header()
    }

    fn assert_format_fail<T: std::fmt::Debug>(result: Result<T>, fail_section: &str) {
        match result {
            Err(PcdError::Format { section, .. }) => assert_eq!(section, fail_section),
            other => panic!("expected format error in {fail_section}, got {other:?}"),
        }
    }

    #[test]
    fn parse_ascii_body() {
        let text = format!("{XYZ_HEADER}DATA ascii\n1 2 3\n4.5 -5 6e1\n");
        let (header, cloud) = parse_str(&text).unwrap();
        assert_eq!(header.data_mode(), DataMode::Ascii);
        assert_eq!(cloud.point(0), [1.0, 2.0, 3.0]);
        assert_eq!(cloud.point(1), [4.5, -5.0, 60.0]);
        assert!(header.is_dense());
    }

    #[test]
    fn parse_binary_body() {
        let mut bytes = format!("{XYZ_HEADER}DATA binary\n").into_bytes();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }
        let (_, cloud) = read_pcd_from(bytes.as_slice()).unwrap();
        assert_eq!(cloud.to_array(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn header_with_comments_and_any_order() {
        let text = "# written by hand\n\
            VERSION .7\n\
            \n\
            FIELDS x y z\n\
            # sizes next\n\
            TYPE F F F\n\
            SIZE 4 4 4\n\
            POINTS 1\n\
            DATA ascii\n\
            7 8 9\n";
        let (header, cloud) = parse_str(text).unwrap();
        assert_eq!(header.version(), PcdVersion::V0_7);
        assert_eq!((header.width(), header.height()), (1, 1));
        assert_eq!(header.viewpoint(), &IDENTITY_VIEWPOINT);
        assert_eq!(header.fields()[0].count(), 1);
        assert_eq!(cloud.point(0), [7.0, 8.0, 9.0]);
    }

    #[test]
    fn points_fall_back_to_width_and_height() {
        let text = "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nWIDTH 3\nHEIGHT 2\nDATA ascii\n";
        let header = header_of(text).unwrap();
        assert_eq!(header.points(), 6);
    }

    #[test]
    fn unknown_data_mode_is_format_error() {
        assert_format_fail(parse_str(&format!("{XYZ_HEADER}DATA hex\n")), "DATA");
        assert_format_fail(
            parse_str(&format!("{XYZ_HEADER}DATA binary_compressed\n")),
            "DATA",
        );
    }

    #[test]
    fn missing_data_line_is_format_error() {
        assert_format_fail(parse_str(XYZ_HEADER), "DATA");
    }

    #[test]
    fn malformed_header_sections() {
        let cases = [
            ("VERSION 0.5\nDATA ascii\n", "VERSION"),
            ("FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 0\nDATA ascii\n", "VERSION"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4\nTYPE F F F\nPOINTS 0\nDATA ascii\n", "SIZE"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F\nPOINTS 0\nDATA ascii\n", "TYPE"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1\nPOINTS 0\nDATA ascii\n", "COUNT"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F X\nPOINTS 0\nDATA ascii\n", "TYPE"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 1 4 4\nTYPE F F F\nPOINTS 0\nDATA ascii\n", "TYPE"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS abc\nDATA ascii\n", "POINTS"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nWIDTH 2\nPOINTS 3\nDATA ascii\n", "POINTS"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 0\nVIEWPOINT 0 0 0\nDATA ascii\n", "VIEWPOINT"),
            ("VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 0\nDENSE maybe\nDATA ascii\n", "DENSE"),
        ];
        for (text, section) in cases {
            assert_format_fail(header_of(text), section);
        }
    }

    #[test]
    fn missing_xyz_field_is_format_error() {
        let text = "VERSION 0.7\nFIELDS x y\nSIZE 4 4\nTYPE F F\nPOINTS 0\nDATA ascii\n";
        assert_format_fail(parse_str(text), "FIELDS");
    }

    #[test]
    fn ascii_token_count_mismatch() {
        let text = format!("{XYZ_HEADER}DATA ascii\n1 2 3\n4 5\n");
        assert_format_fail(parse_str(&text), "data");
    }

    #[test]
    fn ascii_bad_token() {
        let text = format!("{XYZ_HEADER}DATA ascii\n1 2 3\n4 five 6\n");
        assert_format_fail(parse_str(&text), "data");
    }

    #[test]
    fn ascii_short_body_is_truncated() {
        let text = format!("{XYZ_HEADER}DATA ascii\n1 2 3\n");
        match parse_str(&text) {
            Err(PcdError::TruncatedData {
                expected, found, ..
            }) => assert_eq!((expected, found), (2, 1)),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn binary_short_body_is_truncated() {
        let mut bytes = format!("{XYZ_HEADER}DATA binary\n").into_bytes();
        bytes.extend_from_slice(&[0u8; 20]);
        match read_pcd_from(bytes.as_slice()) {
            Err(PcdError::TruncatedData {
                expected, found, ..
            }) => assert_eq!((expected, found), (24, 20)),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn pcl_float_packed_rgb() {
        let packed = pack_rgb(255, 128, 3);
        let text = format!(
            "VERSION 0.7\nFIELDS x y z rgb\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\n\
             POINTS 1\nDATA ascii\n0 0 1 {:e}\n",
            f32::from_bits(packed)
        );
        let (_, cloud) = parse_str(&text).unwrap();
        assert_eq!(cloud.color(0), Some([255, 128, 3]));
    }

    #[test]
    fn separate_color_channels_and_extra_fields() {
        let text = "VERSION 0.7\n\
            FIELDS x y z intensity r g b\n\
            SIZE 8 4 4 4 1 1 1\n\
            TYPE F F F F U U U\n\
            COUNT 1 1 1 2 1 1 1\n\
            POINTS 1\n\
            DATA ascii\n\
            1.5 2 3 0.1 0.2 10 20 30\n";
        let (header, cloud) = parse_str(text).unwrap();
        assert_eq!(header.values_per_point(), 8);
        assert_eq!(cloud.point(0), [1.5, 2.0, 3.0]);
        assert_eq!(cloud.color(0), Some([10, 20, 30]));
    }

    #[test]
    fn binary_with_mixed_field_kinds() {
        let header = "VERSION 0.7\nFIELDS label x y z rgb\nSIZE 2 4 4 8 4\nTYPE U I F F U\nPOINTS 1\nDATA binary\n";
        let mut bytes = header.as_bytes().to_vec();
        bytes.write_u16::<LittleEndian>(9).unwrap();
        bytes.write_i32::<LittleEndian>(-3).unwrap();
        bytes.write_f32::<LittleEndian>(0.25).unwrap();
        bytes.write_f64::<LittleEndian>(8.0).unwrap();
        bytes.write_u32::<LittleEndian>(pack_rgb(1, 2, 3)).unwrap();

        let (header, cloud) = read_pcd_from(bytes.as_slice()).unwrap();
        assert_eq!(header.record_size(), 22);
        assert_eq!(cloud.point(0), [-3.0, 0.25, 8.0]);
        assert_eq!(cloud.color(0), Some([1, 2, 3]));
    }

    #[test]
    fn dense_is_inferred_when_not_declared() {
        let text = format!("{XYZ_HEADER}DATA ascii\n1 2 3\nnan 5 6\n");
        let (header, cloud) = parse_str(&text).unwrap();
        assert!(cloud.x[1].is_nan());
        assert!(!header.is_dense());
    }

    #[test]
    fn declared_dense_is_kept() {
        let text = format!("{XYZ_HEADER}DENSE 0\nDATA ascii\n1 2 3\n4 5 6\n");
        let (header, _) = parse_str(&text).unwrap();
        assert!(!header.is_dense());
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let text = "VERSION 0.7\nFIELDS x x y z\nSIZE 4 4 4 4\nTYPE F F F F\nPOINTS 1\nDATA ascii\n1 2 3 4\n";
        assert_format_fail(header_of(text), "FIELDS");
        assert_format_fail(parse_str(text), "FIELDS");
    }

    #[test]
    fn record_size_overflow_is_format_error() {
        let text = format!(
            "VERSION 0.7\nFIELDS x y z w\nSIZE 4 4 4 8\nTYPE F F F F\nCOUNT 1 1 1 {}\nPOINTS 1\nDATA binary\n",
            u64::MAX
        );
        assert_format_fail(header_of(&text), "COUNT");
        assert_format_fail(parse_str(&text), "COUNT");
    }

    #[test]
    fn large_count_is_checked_against_the_body() {
        let header = "VERSION 0.7\nFIELDS x y z w\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 100000000\nPOINTS 1\n";
        let parsed = header_of(&format!("{header}DATA ascii\n")).unwrap();
        assert_eq!(parsed.values_per_point(), 100_000_003);
        assert_eq!(parsed.record_size(), 400_000_012);

        assert_format_fail(parse_str(&format!("{header}DATA ascii\n1 2 3 4\n")), "data");

        let mut bytes = format!("{header}DATA binary\n").into_bytes();
        bytes.extend_from_slice(&[0u8; 16]);
        match read_pcd_from(bytes.as_slice()) {
            Err(PcdError::TruncatedData {
                expected, found, ..
            }) => assert_eq!((expected, found), (400_000_012, 16)),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn binary_skips_multi_element_fields() {
        let header = "VERSION 0.7\nFIELDS x label y z\nSIZE 4 2 4 4\nTYPE F U F F\nCOUNT 1 2 1 1\nPOINTS 2\nDATA binary\n";
        let mut bytes = header.as_bytes().to_vec();
        for (x, y, z) in [(1.0f32, 2.0f32, 3.0f32), (4.0, 5.0, 6.0)] {
            bytes.write_f32::<LittleEndian>(x).unwrap();
            bytes.write_u16::<LittleEndian>(7).unwrap();
            bytes.write_u16::<LittleEndian>(8).unwrap();
            bytes.write_f32::<LittleEndian>(y).unwrap();
            bytes.write_f32::<LittleEndian>(z).unwrap();
        }

        let (header, cloud) = read_pcd_from(bytes.as_slice()).unwrap();
        assert_eq!(header.record_size(), 16);
        assert_eq!(cloud.to_array(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
