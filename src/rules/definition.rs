//! ABNF definition of ABNF (RFC 5234 §4, RFC 7405)
//!
//! Two departures from the RFC text follow its errata and common practice:
//!
//! - `rulelist = 1*( rule / (*WSP c-nl) )`, so blank and comment-only lines
//!   may be indented
//! - `char-val` distinguishes `%s"..."` (case-sensitive) from `"..."` and
//!   `%i"..."` (case-insensitive)
//!
//! Rules are referenced directly, so a rule's match appears as a child
//! under its own name (`rule` > `rulename`, `defined-as`, `elements`,
//! `c-nl`). Keys of anonymous sub-elements are their ABNF text, e.g.
//! `*(ALPHA / DIGIT / "-")`.

use std::sync::OnceLock;

use super::find;
use crate::operators::{
    alt, concat, forward, literal, optional, range, repeat_0_inf, repeat_1_inf, Op,
};
use crate::rules::core;

/// The ABNF grammar rules as operators
#[derive(Clone)]
pub struct DefinitionRules {
    /// `rulelist = 1*( rule / (*WSP c-nl) )`
    pub rulelist: Op,
    /// `rule = rulename defined-as elements c-nl`
    pub rule: Op,
    /// `rulename = ALPHA *(ALPHA / DIGIT / "-")`
    pub rulename: Op,
    /// `defined-as = *c-wsp ("=" / "=/") *c-wsp`
    pub defined_as: Op,
    /// `elements = alternation *WSP`
    pub elements: Op,
    /// `c-wsp = WSP / (c-nl WSP)`
    pub c_wsp: Op,
    /// `c-nl = comment / CRLF`
    pub c_nl: Op,
    /// `comment = ";" *(WSP / VCHAR) CRLF`
    pub comment: Op,
    /// `alternation = concatenation *(*c-wsp "/" *c-wsp concatenation)`
    pub alternation: Op,
    /// `concatenation = repetition *(1*c-wsp repetition)`
    pub concatenation: Op,
    /// `repetition = [repeat] element`
    pub repetition: Op,
    /// `repeat = 1*DIGIT / (*DIGIT "*" *DIGIT)`
    pub repeat: Op,
    /// `element = rulename / group / option / char-val / num-val / prose-val`
    pub element: Op,
    /// `group = "(" *c-wsp alternation *c-wsp ")"`
    pub group: Op,
    /// `option = "[" *c-wsp alternation *c-wsp "]"`
    pub option: Op,
    /// `char-val = case-insensitive-string / case-sensitive-string`
    pub char_val: Op,
    /// `case-insensitive-string = [ "%i" ] quoted-string`
    pub case_insensitive_string: Op,
    /// `case-sensitive-string = "%s" quoted-string`
    pub case_sensitive_string: Op,
    /// `quoted-string = DQUOTE *(%x20-21 / %x23-7E) DQUOTE`
    pub quoted_string: Op,
    /// `num-val = "%" (bin-val / dec-val / hex-val)`
    pub num_val: Op,
    /// `bin-val = "b" 1*BIT [ 1*("." 1*BIT) / ("-" 1*BIT) ]`
    pub bin_val: Op,
    /// `dec-val = "d" 1*DIGIT [ 1*("." 1*DIGIT) / ("-" 1*DIGIT) ]`
    pub dec_val: Op,
    /// `hex-val = "x" 1*HEXDIG [ 1*("." 1*HEXDIG) / ("-" 1*HEXDIG) ]`
    pub hex_val: Op,
    /// `prose-val = "<" *(%x20-3D / %x3F-7E) ">"`
    pub prose_val: Op,
}

/// `<name> = "<prefix>" 1*<DIGITS> [ 1*("." 1*<DIGITS>) / ("-" 1*<DIGITS>) ]`
fn num_base(name: &str, prefix: &str, digits: &str, digit: &Op) -> Op {
    let many = format!("1*{}", digits);
    let series = format!("\".\" {}", many);
    let span = format!("\"-\" {}", many);
    let choice = format!("1*({}) / ({})", series, span);

    concat(
        name,
        vec![
            literal(format!("\"{}\"", prefix), prefix.as_bytes()),
            repeat_1_inf(many.as_str(), digit.clone()),
            optional(
                format!("[ {} ]", choice),
                alt(
                    choice.as_str(),
                    vec![
                        repeat_1_inf(
                            format!("1*({})", series),
                            concat(
                                series.as_str(),
                                vec![
                                    literal("\".\"", b"."),
                                    repeat_1_inf(many.as_str(), digit.clone()),
                                ],
                            ),
                        ),
                        concat(
                            span.as_str(),
                            vec![
                                literal("\"-\"", b"-"),
                                repeat_1_inf(many.as_str(), digit.clone()),
                            ],
                        ),
                    ],
                ),
            ),
        ],
    )
}

impl DefinitionRules {
    fn build() -> Self {
        let core = core::rules();
        let alternation_ref = forward("alternation");
        let alternation_op: Op = alternation_ref.clone();

        let comment = concat(
            "comment",
            vec![
                literal("\";\"", b";"),
                repeat_0_inf(
                    "*(WSP / VCHAR)",
                    alt("WSP / VCHAR", vec![core.wsp.clone(), core.vchar.clone()]),
                ),
                core.crlf.clone(),
            ],
        );
        let c_nl = alt("c-nl", vec![comment.clone(), core.crlf.clone()]);
        let c_wsp = alt(
            "c-wsp",
            vec![
                core.wsp.clone(),
                concat("c-nl WSP", vec![c_nl.clone(), core.wsp.clone()]),
            ],
        );
        let any_c_wsp = || repeat_0_inf("*c-wsp", c_wsp.clone());

        let rulename = concat(
            "rulename",
            vec![
                core.alpha.clone(),
                repeat_0_inf(
                    "*(ALPHA / DIGIT / \"-\")",
                    alt(
                        "ALPHA / DIGIT / \"-\"",
                        vec![core.alpha.clone(), core.digit.clone(), literal("\"-\"", b"-")],
                    ),
                ),
            ],
        );
        let defined_as = concat(
            "defined-as",
            vec![
                any_c_wsp(),
                alt(
                    "\"=\" / \"=/\"",
                    vec![literal("\"=\"", b"="), literal("\"=/\"", b"=/")],
                ),
                any_c_wsp(),
            ],
        );

        let group = concat(
            "group",
            vec![
                literal("\"(\"", b"("),
                any_c_wsp(),
                alternation_op.clone(),
                any_c_wsp(),
                literal("\")\"", b")"),
            ],
        );
        let option = concat(
            "option",
            vec![
                literal("\"[\"", b"["),
                any_c_wsp(),
                alternation_op,
                any_c_wsp(),
                literal("\"]\"", b"]"),
            ],
        );

        let quoted_string = concat(
            "quoted-string",
            vec![
                core.dquote.clone(),
                repeat_0_inf(
                    "*(%x20-21 / %x23-7E)",
                    alt(
                        "%x20-21 / %x23-7E",
                        vec![
                            range("%x20-21", &[0x20], &[0x21]),
                            range("%x23-7E", &[0x23], &[0x7E]),
                        ],
                    ),
                ),
                core.dquote.clone(),
            ],
        );
        let case_insensitive_string = concat(
            "case-insensitive-string",
            vec![
                optional("[ \"%i\" ]", literal("\"%i\"", b"%i")),
                quoted_string.clone(),
            ],
        );
        let case_sensitive_string = concat(
            "case-sensitive-string",
            vec![literal("\"%s\"", b"%s"), quoted_string.clone()],
        );
        let char_val = alt(
            "char-val",
            vec![case_insensitive_string.clone(), case_sensitive_string.clone()],
        );

        let bin_val = num_base("bin-val", "b", "BIT", &core.bit);
        let dec_val = num_base("dec-val", "d", "DIGIT", &core.digit);
        let hex_val = num_base("hex-val", "x", "HEXDIG", &core.hexdig);
        let num_val = concat(
            "num-val",
            vec![
                literal("\"%\"", b"%"),
                alt(
                    "bin-val / dec-val / hex-val",
                    vec![bin_val.clone(), dec_val.clone(), hex_val.clone()],
                ),
            ],
        );

        let prose_val = concat(
            "prose-val",
            vec![
                literal("\"<\"", b"<"),
                repeat_0_inf(
                    "*(%x20-3D / %x3F-7E)",
                    alt(
                        "%x20-3D / %x3F-7E",
                        vec![
                            range("%x20-3D", &[0x20], &[0x3D]),
                            range("%x3F-7E", &[0x3F], &[0x7E]),
                        ],
                    ),
                ),
                literal("\">\"", b">"),
            ],
        );

        let element = alt(
            "element",
            vec![
                rulename.clone(),
                group.clone(),
                option.clone(),
                char_val.clone(),
                num_val.clone(),
                prose_val.clone(),
            ],
        );
        let repeat = alt(
            "repeat",
            vec![
                repeat_1_inf("1*DIGIT", core.digit.clone()),
                concat(
                    "*DIGIT \"*\" *DIGIT",
                    vec![
                        repeat_0_inf("*DIGIT", core.digit.clone()),
                        literal("\"*\"", b"*"),
                        repeat_0_inf("*DIGIT", core.digit.clone()),
                    ],
                ),
            ],
        );
        let repetition = concat(
            "repetition",
            vec![optional("[repeat]", repeat.clone()), element.clone()],
        );
        let concatenation = concat(
            "concatenation",
            vec![
                repetition.clone(),
                repeat_0_inf(
                    "*(1*c-wsp repetition)",
                    concat(
                        "1*c-wsp repetition",
                        vec![repeat_1_inf("1*c-wsp", c_wsp.clone()), repetition.clone()],
                    ),
                ),
            ],
        );
        let alternation = concat(
            "alternation",
            vec![
                concatenation.clone(),
                repeat_0_inf(
                    "*(*c-wsp \"/\" *c-wsp concatenation)",
                    concat(
                        "*c-wsp \"/\" *c-wsp concatenation",
                        vec![
                            any_c_wsp(),
                            literal("\"/\"", b"/"),
                            any_c_wsp(),
                            concatenation.clone(),
                        ],
                    ),
                ),
            ],
        );
        alternation_ref.define(&alternation);

        let elements = concat(
            "elements",
            vec![alternation.clone(), repeat_0_inf("*WSP", core.wsp.clone())],
        );
        let rule = concat(
            "rule",
            vec![rulename.clone(), defined_as.clone(), elements.clone(), c_nl.clone()],
        );
        let rulelist = repeat_1_inf(
            "rulelist",
            alt(
                "rule / (*WSP c-nl)",
                vec![
                    rule.clone(),
                    concat(
                        "*WSP c-nl",
                        vec![repeat_0_inf("*WSP", core.wsp.clone()), c_nl.clone()],
                    ),
                ],
            ),
        );

        Self {
            rulelist,
            rule,
            rulename,
            defined_as,
            elements,
            c_wsp,
            c_nl,
            comment,
            alternation,
            concatenation,
            repetition,
            repeat,
            element,
            group,
            option,
            char_val,
            case_insensitive_string,
            case_sensitive_string,
            quoted_string,
            num_val,
            bin_val,
            dec_val,
            hex_val,
            prose_val,
        }
    }

    /// Rule by its ABNF name (`"defined-as"`, `"c-wsp"`, ...), ignoring case
    pub fn get(&self, name: &str) -> Option<&Op> {
        find(
            [
                ("rulelist", &self.rulelist),
                ("rule", &self.rule),
                ("rulename", &self.rulename),
                ("defined-as", &self.defined_as),
                ("elements", &self.elements),
                ("c-wsp", &self.c_wsp),
                ("c-nl", &self.c_nl),
                ("comment", &self.comment),
                ("alternation", &self.alternation),
                ("concatenation", &self.concatenation),
                ("repetition", &self.repetition),
                ("repeat", &self.repeat),
                ("element", &self.element),
                ("group", &self.group),
                ("option", &self.option),
                ("char-val", &self.char_val),
                ("case-insensitive-string", &self.case_insensitive_string),
                ("case-sensitive-string", &self.case_sensitive_string),
                ("quoted-string", &self.quoted_string),
                ("num-val", &self.num_val),
                ("bin-val", &self.bin_val),
                ("dec-val", &self.dec_val),
                ("hex-val", &self.hex_val),
                ("prose-val", &self.prose_val),
            ],
            name,
        )
    }
}

static DEFINITION_RULES: OnceLock<DefinitionRules> = OnceLock::new();

/// The shared ABNF definition rule set
pub fn rules() -> &'static DefinitionRules {
    DEFINITION_RULES.get_or_init(DefinitionRules::build)
}
