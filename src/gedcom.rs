//! Streaming GEDCOM reader: a line tokenizer plus a level-0 record assembler.
//!
//! Only one level-0 record (with its nested sub-records) is materialised at a time, so a
//! member of any size is read in memory proportional to its largest record.
//!
//! Text is decoded per the byte order mark, else per the header's `CHAR` declaration.

use anyhow::{bail, Context, Result};
use encoding_rs::{Decoder, Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use regex::Regex;
use std::io::{self, BufRead};
use std::sync::OnceLock;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})\s+(?:@([^@\s]+)@\s+)?([A-Za-z0-9_]+)(?:[ \t](.*))?$")
            .expect("GEDCOM line pattern is valid")
    })
}

/// One physical GEDCOM line: `level [@xref@] tag [value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub number: u64,
    pub level: usize,
    pub xref: Option<String>,
    pub tag: String,
    pub value: String,
}

/// Parse a single line (without its terminator). `number` is 1-based and only used in errors.
pub fn parse_line(number: u64, text: &str) -> Result<Line> {
    let caps = match line_regex().captures(text) {
        Some(c) => c,
        None => bail!("line {}: not a GEDCOM line: {:?}", number, text),
    };
    let level: usize = caps[1]
        .parse()
        .with_context(|| format!("line {}: bad level", number))?;
    Ok(Line {
        number,
        level,
        xref: caps.get(2).map(|m| m.as_str().to_string()),
        tag: caps[3].to_string(),
        value: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

/// A record with its nested sub-records. `xref` is stored without the surrounding `@`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub xref: Option<String>,
    pub tag: String,
    pub value: String,
    pub children: Vec<Record>,
}

impl Record {
    fn from_line(line: Line) -> Self {
        Self { xref: line.xref, tag: line.tag, value: line.value, children: Vec::new() }
    }

    /// Identifier of the record, `""` when it carries none.
    pub fn xref_id(&self) -> &str {
        self.xref.as_deref().unwrap_or("")
    }

    /// First direct sub-record with the given tag.
    pub fn sub_tag(&self, tag: &str) -> Option<&Record> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn sub_tag_value(&self, tag: &str) -> Option<&str> {
        self.sub_tag(tag).map(|r| r.value.as_str())
    }

    /// The value read as a pointer (`@F1@` -> `F1`), if it is one.
    pub fn pointer(&self) -> Option<&str> {
        let v = self.value.trim();
        let inner = v.strip_prefix('@')?.strip_suffix('@')?;
        if inner.is_empty() || inner.contains('@') {
            return None;
        }
        Some(inner)
    }
}

/// How line bytes become text.
#[derive(Clone, Debug)]
enum Charset {
    Decoded(&'static Encoding),
    /// A character set with no decoder here (ANSEL, IBM PC code pages): its ASCII range is
    /// read as is and any other byte is an error.
    AsciiOnly(String),
}

/// Character set for a `HEAD.CHAR` value.
fn charset_for(label: &str) -> Charset {
    match label.to_ascii_uppercase().as_str() {
        "UTF-8" | "UTF8" | "UNICODE" => Charset::Decoded(UTF_8),
        "ANSI" | "IBM WINDOWS" | "WINDOWS" => Charset::Decoded(WINDOWS_1252),
        "ASCII" | "ANSEL" | "IBMPC" | "IBM PC" | "IBM DOS" => Charset::AsciiOnly(label.to_string()),
        other => match Encoding::for_label(other.as_bytes()) {
            Some(enc) if enc.is_ascii_compatible() => Charset::Decoded(enc),
            _ => Charset::AsciiOnly(label.to_string()),
        },
    }
}

/// Streaming UTF-16 to UTF-8 transcoder, used after a UTF-16 byte order mark.
struct Wide {
    decoder: Decoder,
    out: Vec<u8>,
    pos: usize,
    done: bool,
    warned: bool,
}

impl Wide {
    fn new(enc: &'static Encoding) -> Self {
        Self {
            decoder: enc.new_decoder_without_bom_handling(),
            out: Vec::new(),
            pos: 0,
            done: false,
            warned: false,
        }
    }

    fn read_until_newline<R: BufRead>(&mut self, inner: &mut R, buf: &mut Vec<u8>) -> io::Result<usize> {
        let start = buf.len();
        loop {
            let avail = &self.out[self.pos..];
            if let Some(i) = avail.iter().position(|&b| b == b'\n') {
                buf.extend_from_slice(&avail[..=i]);
                self.pos += i + 1;
                return Ok(buf.len() - start);
            }
            buf.extend_from_slice(avail);
            self.pos = self.out.len();
            if self.done {
                return Ok(buf.len() - start);
            }
            self.refill(inner)?;
        }
    }

    fn refill<R: BufRead>(&mut self, inner: &mut R) -> io::Result<()> {
        let input = inner.fill_buf()?;
        let last = input.is_empty();
        let cap = self
            .decoder
            .max_utf8_buffer_length(input.len())
            .unwrap_or(input.len() * 3 + 16);
        self.out.clear();
        self.out.resize(cap, 0);
        self.pos = 0;
        let (_, read, written, had_errors) = self.decoder.decode_to_utf8(input, &mut self.out, last);
        self.out.truncate(written);
        inner.consume(read);
        self.done = last;
        if had_errors && !self.warned {
            tracing::warn!("invalid {} sequences replaced with U+FFFD", self.decoder.encoding().name());
            self.warned = true;
        }
        Ok(())
    }
}

/// Splits a byte stream into numbered text lines, skipping blank ones.
///
/// A byte order mark fixes the encoding. Without one, lines are UTF-8 until the header
/// declares another character set through `HEAD.CHAR`.
struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    number: u64,
    bom_checked: bool,
    wide: Option<Wide>,
    charset: Charset,
    locked: bool,
    warned: bool,
}

impl<R: BufRead> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(256),
            number: 0,
            bom_checked: false,
            wide: None,
            charset: Charset::Decoded(UTF_8),
            locked: false,
            warned: false,
        }
    }

    fn read_bom(&mut self) -> io::Result<()> {
        self.bom_checked = true;
        let head = self.inner.fill_buf()?;
        let (bom_len, wide) = if head.starts_with(UTF8_BOM) {
            (UTF8_BOM.len(), None)
        } else if head.starts_with(b"\xFF\xFE") {
            (2, Some(UTF_16LE))
        } else if head.starts_with(b"\xFE\xFF") {
            (2, Some(UTF_16BE))
        } else {
            return Ok(());
        };
        self.inner.consume(bom_len);
        self.wide = wide.map(Wide::new);
        self.locked = true;
        Ok(())
    }

    /// Switch to the character set named by `HEAD.CHAR`, unless a byte order mark already
    /// fixed the encoding.
    fn declare_charset(&mut self, label: &str) {
        if self.locked {
            return;
        }
        self.charset = charset_for(label.trim());
        tracing::debug!("HEAD.CHAR {:?}: reading as {:?}", label.trim(), self.charset);
    }

    fn next_text(&mut self) -> Result<Option<(u64, String)>> {
        if !self.bom_checked {
            self.read_bom()?;
        }
        loop {
            self.buf.clear();
            let n = match &mut self.wide {
                Some(w) => w.read_until_newline(&mut self.inner, &mut self.buf)?,
                None => self.inner.read_until(b'\n', &mut self.buf)?,
            };
            if n == 0 {
                return Ok(None);
            }
            self.number += 1;

            let mut bytes: &[u8] = &self.buf;
            if let Some(rest) = bytes.strip_suffix(b"\n") { bytes = rest; }
            if let Some(rest) = bytes.strip_suffix(b"\r") { bytes = rest; }

            let text = decode_line(&self.charset, self.number, bytes, &mut self.warned)?;
            if text.trim().is_empty() {
                continue;
            }
            return Ok(Some((self.number, text)));
        }
    }
}

fn decode_line(charset: &Charset, number: u64, bytes: &[u8], warned: &mut bool) -> Result<String> {
    match charset {
        Charset::Decoded(enc) => {
            let (text, had_errors) = enc.decode_without_bom_handling(bytes);
            if had_errors && !*warned {
                tracing::warn!(
                    "line {}: bytes that are not valid {} replaced with U+FFFD (first occurrence only)",
                    number,
                    enc.name()
                );
                *warned = true;
            }
            Ok(text.into_owned())
        }
        Charset::AsciiOnly(name) => {
            if let Some(b) = bytes.iter().find(|b| !b.is_ascii()) {
                bail!(
                    "line {}: byte 0x{:02X} is outside the ASCII range of character set {}, which cannot be decoded",
                    number,
                    b,
                    name
                );
            }
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Assembles level-0 records from a GEDCOM byte stream.
pub struct RecordReader<R> {
    lines: LineReader<R>,
    pending: Option<Line>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: LineReader::new(inner),
            pending: None,
        }
    }

    fn next_line(&mut self) -> Result<Option<Line>> {
        match self.lines.next_text()? {
            Some((number, text)) => parse_line(number, &text).map(Some),
            None => Ok(None),
        }
    }

    /// Read the next level-0 record, or `None` at end of stream.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let head = match self.pending.take() {
            Some(line) => line,
            None => match self.next_line()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        if head.level != 0 {
            bail!("line {}: expected a level 0 record, found level {}", head.number, head.level);
        }

        // stack[i] is the open record at level i
        let mut stack = vec![Record::from_line(head)];
        while let Some(line) = self.next_line()? {
            if line.level == 0 {
                self.pending = Some(line);
                break;
            }
            if line.level > stack.len() {
                bail!(
                    "line {}: level {} cannot follow level {}",
                    line.number,
                    line.level,
                    stack.len() - 1
                );
            }
            fold_to(&mut stack, line.level);
            if line.level == 1 && line.tag == "CHAR" && stack[0].tag == "HEAD" {
                self.lines.declare_charset(&line.value);
            }
            match line.tag.as_str() {
                "CONC" => {
                    if let Some(parent) = stack.last_mut() {
                        parent.value.push_str(&line.value);
                    }
                }
                "CONT" => {
                    if let Some(parent) = stack.last_mut() {
                        parent.value.push('\n');
                        parent.value.push_str(&line.value);
                    }
                }
                _ => stack.push(Record::from_line(line)),
            }
        }
        fold_to(&mut stack, 1);
        Ok(stack.pop())
    }

    /// Every level-0 record, in file order.
    pub fn records(self) -> Records<R> {
        Records { reader: self, tag: None, failed: false }
    }

    /// Level-0 records with the given tag (e.g. `"INDI"`), in file order.
    pub fn records0(self, tag: &str) -> Records<R> {
        Records { reader: self, tag: Some(tag.to_string()), failed: false }
    }
}

/// Close open records down to `depth`, attaching each to its parent.
fn fold_to(stack: &mut Vec<Record>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(child) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(child);
            }
        }
    }
}

/// Lazy, forward-only record sequence. Stops after the first error.
pub struct Records<R> {
    reader: RecordReader<R>,
    tag: Option<String>,
    failed: bool,
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.reader.next_record() {
                Ok(Some(rec)) => {
                    if self.tag.as_deref().map_or(true, |t| rec.tag == t) {
                        return Some(Ok(rec));
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
