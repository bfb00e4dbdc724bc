//! Indirect objects and the file trailer.

use std::fmt;
use std::io::Write;

use miniz_oxide::deflate::compress_to_vec_zlib;

const COMPRESSION_LEVEL: u8 = 6;

/// Reference to an indirect object, printed as `N 0 R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ObjRef(usize);

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 0 R", self.0)
    }
}

/// Every object of the file, in object-number order.
#[derive(Default)]
pub(crate) struct ObjectTable {
    bodies: Vec<Option<Vec<u8>>>,
}

impl ObjectTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim an object number now, fill it in later with `set`.
    pub(crate) fn reserve(&mut self) -> ObjRef {
        self.bodies.push(None);
        ObjRef(self.bodies.len())
    }

    pub(crate) fn set(&mut self, obj: ObjRef, body: impl Into<Vec<u8>>) {
        if let Some(slot) = self.bodies.get_mut(obj.0 - 1) {
            *slot = Some(body.into());
        }
    }

    pub(crate) fn add(&mut self, body: impl Into<Vec<u8>>) -> ObjRef {
        let obj = self.reserve();
        self.set(obj, body);
        obj
    }

    /// A stream object. `entries` go into its dictionary next to `/Length`;
    /// with `deflate` the data is zlib-compressed and marked FlateDecode.
    pub(crate) fn add_stream(&mut self, entries: &str, data: &[u8], deflate: bool) -> ObjRef {
        let compressed;
        let (payload, filter) = if deflate {
            compressed = compress_to_vec_zlib(data, COMPRESSION_LEVEL);
            (compressed.as_slice(), " /Filter /FlateDecode")
        } else {
            (data, "")
        };
        let separator = if entries.is_empty() { "" } else { " " };
        let mut body = format!(
            "<< /Length {}{}{}{} >>\nstream\n",
            payload.len(),
            filter,
            separator,
            entries
        )
        .into_bytes();
        body.extend_from_slice(payload);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    /// Header, objects, cross-reference table and trailer.
    pub(crate) fn finish(self, root: ObjRef, info: ObjRef) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n");

        let mut offsets = Vec::with_capacity(self.bodies.len());
        for (index, body) in self.bodies.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n", index + 1);
            match body {
                Some(bytes) => out.extend_from_slice(bytes),
                None => out.extend_from_slice(b"null"),
            }
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", self.bodies.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root {} /Info {} >>\nstartxref\n{}\n%%EOF\n",
            self.bodies.len() + 1,
            root,
            info,
            xref
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_objects_keep_their_numbers() {
        let mut table = ObjectTable::new();
        let a = table.reserve();
        let b = table.add("<< /B true >>");
        table.set(a, "<< /A true >>");
        assert_eq!(a.to_string(), "1 0 R");
        assert_eq!(b.to_string(), "2 0 R");

        let bytes = table.finish(a, b);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("1 0 obj\n<< /A true >>\nendobj"));
        assert!(text.contains("xref\n0 3\n"));
        assert!(text.contains("/Root 1 0 R /Info 2 0 R"));
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut table = ObjectTable::new();
        let root = table.add("<< /Type /Catalog >>");
        let info = table.add("<< >>");
        let bytes = table.finish(root, info);

        let xref_at = find(&bytes, b"xref\n").unwrap();
        let xref = String::from_utf8_lossy(&bytes[xref_at..]).into_owned();
        let offsets: Vec<usize> = xref
            .lines()
            .skip(3)
            .take(2)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(bytes[offsets[0]..].starts_with(b"1 0 obj"));
        assert!(bytes[offsets[1]..].starts_with(b"2 0 obj"));
    }

    #[test]
    fn unfilled_reservation_is_null() {
        let mut table = ObjectTable::new();
        let hole = table.reserve();
        let info = table.add("<< >>");
        let bytes = table.finish(hole, info);
        assert!(find(&bytes, b"1 0 obj\nnull\nendobj").is_some());
    }

    #[test]
    fn streams_carry_their_length() {
        let mut table = ObjectTable::new();
        table.add_stream("/Subtype /Image", b"abc", false);
        let deflated = table.add_stream("", &[b'x'; 500], true);
        let info = table.add("<< >>");
        let bytes = table.finish(deflated, info);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("<< /Length 3 /Subtype /Image >>\nstream\nabc\nendstream"));
        assert!(text.contains("/Filter /FlateDecode >>"));
    }
}
