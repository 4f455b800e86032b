//! Core rules (RFC 5234 Appendix B.1)
//!
//! One deliberate extension: `CRLF` also accepts a bare `LF`, so grammars
//! and messages with Unix line endings parse.

use std::sync::OnceLock;

use super::find;
use crate::operators::{alt, alt_first, concat, literal, literal_cs, range, repeat_0_inf, Op};

/// The core rules as operators
///
/// Node keys are the rule names (`"ALPHA"`, `"CRLF"`, ...).
#[derive(Clone)]
pub struct CoreRules {
    /// `ALPHA = %x41-5A / %x61-7A`
    pub alpha: Op,
    /// `BIT = "0" / "1"`
    pub bit: Op,
    /// `CHAR = %x01-7F`
    pub char: Op,
    /// `CR = %x0D`
    pub cr: Op,
    /// `CRLF = CR LF / LF`
    pub crlf: Op,
    /// `CTL = %x00-1F / %x7F`
    pub ctl: Op,
    /// `DIGIT = %x30-39`
    pub digit: Op,
    /// `DQUOTE = %x22`
    pub dquote: Op,
    /// `HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"`
    pub hexdig: Op,
    /// `HTAB = %x09`
    pub htab: Op,
    /// `LF = %x0A`
    pub lf: Op,
    /// `LWSP = *(WSP / CRLF WSP)`
    pub lwsp: Op,
    /// `OCTET = %x00-FF`
    pub octet: Op,
    /// `SP = %x20`
    pub sp: Op,
    /// `VCHAR = %x21-7E`
    pub vchar: Op,
    /// `WSP = SP / HTAB`
    pub wsp: Op,
}

impl CoreRules {
    fn build() -> Self {
        let cr = literal_cs("CR", &[0x0D]);
        let lf = literal_cs("LF", &[0x0A]);
        let crlf = alt_first(
            "CRLF",
            vec![concat("CR LF", vec![cr.clone(), lf.clone()]), lf.clone()],
        );
        let digit = range("DIGIT", &[0x30], &[0x39]);
        let sp = literal_cs("SP", &[0x20]);
        let htab = literal_cs("HTAB", &[0x09]);
        let wsp = alt("WSP", vec![sp.clone(), htab.clone()]);

        let hexdig = alt(
            "HEXDIG",
            vec![
                digit.clone(),
                literal("\"A\"", b"A"),
                literal("\"B\"", b"B"),
                literal("\"C\"", b"C"),
                literal("\"D\"", b"D"),
                literal("\"E\"", b"E"),
                literal("\"F\"", b"F"),
            ],
        );
        let lwsp = repeat_0_inf(
            "LWSP",
            alt(
                "WSP / CRLF WSP",
                vec![wsp.clone(), concat("CRLF WSP", vec![crlf.clone(), wsp.clone()])],
            ),
        );

        Self {
            alpha: alt(
                "ALPHA",
                vec![
                    range("%x41-5A", &[0x41], &[0x5A]),
                    range("%x61-7A", &[0x61], &[0x7A]),
                ],
            ),
            bit: alt("BIT", vec![literal("\"0\"", b"0"), literal("\"1\"", b"1")]),
            char: range("CHAR", &[0x01], &[0x7F]),
            cr,
            crlf,
            ctl: alt(
                "CTL",
                vec![range("%x00-1F", &[0x00], &[0x1F]), literal_cs("%x7F", &[0x7F])],
            ),
            digit,
            dquote: literal_cs("DQUOTE", &[0x22]),
            hexdig,
            htab,
            lf,
            lwsp,
            octet: range("OCTET", &[0x00], &[0xFF]),
            sp,
            vchar: range("VCHAR", &[0x21], &[0x7E]),
            wsp,
        }
    }

    /// Rule by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&Op> {
        find(
            [
                ("ALPHA", &self.alpha),
                ("BIT", &self.bit),
                ("CHAR", &self.char),
                ("CR", &self.cr),
                ("CRLF", &self.crlf),
                ("CTL", &self.ctl),
                ("DIGIT", &self.digit),
                ("DQUOTE", &self.dquote),
                ("HEXDIG", &self.hexdig),
                ("HTAB", &self.htab),
                ("LF", &self.lf),
                ("LWSP", &self.lwsp),
                ("OCTET", &self.octet),
                ("SP", &self.sp),
                ("VCHAR", &self.vchar),
                ("WSP", &self.wsp),
            ],
            name,
        )
    }
}

static CORE_RULES: OnceLock<CoreRules> = OnceLock::new();

/// The shared core rule set
pub fn rules() -> &'static CoreRules {
    CORE_RULES.get_or_init(CoreRules::build)
}
