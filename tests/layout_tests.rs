//! End-to-end layout scenarios over hand-built document trees.
//!
//! The trees mirror what an AST-to-document translator for a curly-brace
//! language would produce: blocks with forced breaks around their bodies,
//! call argument levels with a unified leading break and independent
//! separators, and method chains wired for last-level inlining.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use layline::{
    render, render_chunks, Break, BreakBehaviour, CommentReflower, Doc, FillMode,
    LastLevelBreakability, LayoutOptions, Level, OpenOp, PassthroughComments, Span,
};

/// Allocates consecutive, non-overlapping spans in emission order.
struct Src(u32);

impl Src {
    fn new() -> Src {
        Src(0)
    }

    fn t(&mut self, text: &str) -> Doc {
        let span = Span::new(self.0, self.0 + text.len() as u32);
        self.0 += text.len() as u32 + 1;
        Doc::token(text, span)
    }

    fn comment(&mut self, text: &str) -> Doc {
        let span = Span::new(self.0, self.0 + text.len() as u32);
        self.0 += text.len() as u32 + 1;
        Doc::line_comment(text, span)
    }
}

fn unified(flat: &str, plus_indent: u32) -> Doc {
    Break::new(FillMode::Unified, flat, plus_indent).into()
}

fn independent(flat: &str, plus_indent: u32) -> Doc {
    Break::new(FillMode::Independent, flat, plus_indent).into()
}

/// `header { body } close`, with the body on its own lines.
fn block(header: Doc, body_children: Vec<Doc>, close: Doc, plus_indent: u32) -> Doc {
    let mut kids = vec![Break::forced().into()];
    kids.extend(body_children);
    let body = Level::new(OpenOp::breaking(plus_indent), kids);
    Level::new(
        OpenOp::default(),
        vec![header, body.into(), Break::forced().into(), close],
    )
    .into()
}

/// `f(a, b, ...)` with a unified leading break and independent separators.
fn call(src: &mut Src, name_and_paren: &str, args: &[&str], arg_indent: u32) -> Doc {
    let open = src.t(name_and_paren);
    let mut arg_docs = vec![unified("", 0)];
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            arg_docs.push(independent(" ", 0));
        }
        arg_docs.push(src.t(arg));
    }
    let arg_level = Level::new(OpenOp::breaking(arg_indent), arg_docs);
    let close = src.t(");");
    Level::new(OpenOp::default(), vec![open, arg_level.into(), close]).into()
}

fn aosp_class(src: &mut Src, args: &[&str], call_name: &str) -> Doc {
    let class_open = src.t("class A {");
    let method_open = src.t("void b() {");
    let while_open = src.t("while (true) {");
    let stmt = call(src, call_name, args, 8);
    let while_close = src.t("}");
    let method_close = src.t("}");
    let class_close = src.t("}");

    let while_block = block(while_open, vec![stmt], while_close, 4);
    let method_block = block(method_open, vec![while_block], method_close, 4);
    block(class_open, vec![method_block], class_close, 4)
}

#[test]
fn nested_blocks_keep_fitting_call_flat() {
    let mut src = Src::new();
    let doc = aosp_class(
        &mut src,
        &["a,", "b,", "c,", "d,", "e,", "f,", "g,", "h,", "i,", "j"],
        "f(",
    );
    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(100)).unwrap();
    assert_eq!(
        out,
        "class A {\n\
         \x20   void b() {\n\
         \x20       while (true) {\n\
         \x20           f(a, b, c, d, e, f, g, h, i, j);\n\
         \x20       }\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn wide_call_breaks_arguments_onto_continuation_line() {
    let mut src = Src::new();
    let doc = aosp_class(
        &mut src,
        &[
            "because,", "it,", "is,", "just,", "so,", "very,", "very,", "very,", "very,",
            "looong",
        ],
        "weCanBeCertainThatThisWillEndUpGettingWrapped(",
    );
    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(100)).unwrap();
    assert_eq!(
        out,
        "class A {\n\
         \x20   void b() {\n\
         \x20       while (true) {\n\
         \x20           weCanBeCertainThatThisWillEndUpGettingWrapped(\n\
         \x20                   because, it, is, just, so, very, very, very, very, looong);\n\
         \x20       }\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn narrow_budget_fill_wraps_arguments() {
    let mut src = Src::new();
    let doc = aosp_class(
        &mut src,
        &["a,", "b,", "c,", "d,", "e,", "f,", "g,", "h,", "i,", "j"],
        "f(",
    );
    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(40)).unwrap();
    assert_eq!(
        out,
        "class A {\n\
         \x20   void b() {\n\
         \x20       while (true) {\n\
         \x20           f(\n\
         \x20                   a, b, c, d, e, f, g,\n\
         \x20                   h, i, j);\n\
         \x20       }\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn empty_class_body_stays_flat() {
    let mut src = Src::new();
    let open = src.t("class T {");
    let body = Level::new(OpenOp::breaking(2), vec![]);
    let close = src.t("}");
    let doc: Doc = Level::new(OpenOp::default(), vec![open, body.into(), close]).into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::default()).unwrap();
    assert_eq!(out, "class T {}\n");
}

#[test]
fn class_with_method_breaks_body() {
    let mut src = Src::new();
    let open = src.t("class X {");
    let method = Level::new(OpenOp::default(), vec![src.t("Y() {}")]);
    let close = src.t("}");
    let doc = block(open, vec![method.into()], close, 2);

    let out = render(&doc, &PassthroughComments, &LayoutOptions::default()).unwrap();
    assert_eq!(out, "class X {\n  Y() {}\n}\n");
}

#[test]
fn method_chain_inlines_last_level() {
    // `val x = builder.withAlpha().create()` at width 25. Breaking the
    // assignment normally costs three newlines; inlining the chain after
    // `=` and breaking only at the dots costs two.
    let mut src = Src::new();
    let chain = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::BreakThisLevel,
            breakability_if_last_level: LastLevelBreakability::AcceptInlineChain,
            plus_indent: 4,
            ..OpenOp::default()
        },
        vec![
            unified("", 4),
            src.t(".withAlpha()"),
            unified("", 4),
            src.t(".create()"),
        ],
    );
    let receiver = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::PreferBreakingLastInnerLevel {
                keep_indent_when_inlined: false,
            },
            breakability_if_last_level: LastLevelBreakability::CheckInner,
            plus_indent: 4,
            ..OpenOp::default()
        },
        vec![src.t("builder"), chain.into()],
    );
    let mut assignment_kids = vec![src.t("val x ="), unified(" ", 4)];
    assignment_kids.push(receiver.into());
    let doc: Doc = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::PreferBreakingLastInnerLevel {
                keep_indent_when_inlined: false,
            },
            ..OpenOp::default()
        },
        assignment_kids,
    )
    .into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(25)).unwrap();
    assert_eq!(out, "val x = builder\n        .withAlpha()\n        .create()\n");
}

#[test]
fn simple_chain_skips_check_inner() {
    // With `simple` set along the chain, the if-simple breakability
    // accepts the inline chain even though the last level would not
    // survive a check-inner dispatch.
    let mut src = Src::new();
    let last = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::BreakThisLevel,
            breakability_if_last_level:
                LastLevelBreakability::AcceptInlineChainIfSimpleOtherwiseCheckInner,
            plus_indent: 4,
            simple: true,
            ..OpenOp::default()
        },
        vec![unified("", 0), src.t("yyyyyyyyy")],
    );
    let doc: Doc = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::PreferBreakingLastInnerLevel {
                keep_indent_when_inlined: false,
            },
            simple: true,
            ..OpenOp::default()
        },
        vec![src.t("x ="), unified(" ", 4), last.into()],
    )
    .into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(12)).unwrap();
    assert_eq!(out, "x =\n    yyyyyyyyy\n");
}

#[test]
fn check_inner_on_wrong_behaviour_is_malformed() {
    let mut src = Src::new();
    let last = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::BreakThisLevel,
            breakability_if_last_level: LastLevelBreakability::CheckInner,
            plus_indent: 4,
            ..OpenOp::default()
        },
        vec![unified("", 0), src.t("yyyyyyyy")],
    );
    let doc: Doc = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::PreferBreakingLastInnerLevel {
                keep_indent_when_inlined: false,
            },
            ..OpenOp::default()
        },
        vec![src.t("x = "), last.into()],
    )
    .into();

    let err = render(&doc, &PassthroughComments, &LayoutOptions::new(10)).unwrap_err();
    assert!(err.to_string().contains("malformed document tree"));
}

#[test]
fn overwide_token_is_emitted_unbroken() {
    let mut src = Src::new();
    let doc: Doc = Level::new(
        OpenOp::default(),
        vec![src.t("anIdentifierFarWiderThanTheBudget")],
    )
    .into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(10)).unwrap();
    assert_eq!(out, "anIdentifierFarWiderThanTheBudget\n");
}

#[test]
fn break_only_if_inner_levels_inlines_prefix() {
    // `x = func(longishAAAAAAA)` at width 20: the call's argument level
    // must break either way, so the assignment keeps `x = func(` on one
    // line instead of breaking after `=`.
    let mut src = Src::new();
    let args = Level::new(
        OpenOp::breaking(4),
        vec![unified("", 0), src.t("longishAAAAAAA")],
    );
    let callee = Level::new(
        OpenOp::breaking(0),
        vec![src.t("func("), args.into(), src.t(")")],
    );
    let doc: Doc = Level::new(
        OpenOp {
            break_behaviour: BreakBehaviour::BreakOnlyIfInnerLevelsThenFitOnOneLine {
                keep_indent_when_inlined: false,
            },
            ..OpenOp::default()
        },
        vec![src.t("x ="), unified(" ", 4), callee.into()],
    )
    .into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::new(20)).unwrap();
    assert_eq!(out, "x = func(\n    longishAAAAAAA)\n");
}

#[test]
fn comment_reflow_wraps_on_continuation_lines() {
    let mut src = Src::new();
    let doc: Doc = Level::new(
        OpenOp::default(),
        vec![src.t("code();"), Doc::space(), src.comment("// aaa bbb ccc dddd")],
    )
    .into();

    let out = render(&doc, &CommentReflower::new(), &LayoutOptions::new(18)).unwrap();
    assert_eq!(
        out,
        "code(); // aaa bbb\n        // ccc\n        // dddd\n"
    );
}

#[test]
fn moe_comments_are_preserved_verbatim() {
    let mut src = Src::new();
    let doc: Doc = Level::new(
        OpenOp::default(),
        vec![
            src.t("a();"),
            Doc::space(),
            src.comment("// MOE: keep this exactly as written"),
        ],
    )
    .into();

    let out = render(&doc, &CommentReflower::new(), &LayoutOptions::new(10)).unwrap();
    assert_eq!(out, "a(); // MOE: keep this exactly as written\n");
}

#[test]
fn tombstones_emit_nothing() {
    let mut src = Src::new();
    let doc: Doc = Level::new(
        OpenOp::default(),
        vec![src.t("a"), Doc::tombstone(), src.t("b")],
    )
    .into();

    let out = render(&doc, &PassthroughComments, &LayoutOptions::default()).unwrap();
    assert_eq!(out, "ab\n");
}

#[test]
fn chunks_have_monotone_spans() {
    let mut src = Src::new();
    let doc = aosp_class(
        &mut src,
        &["a,", "b,", "c,", "d,", "e,", "f,", "g,", "h,", "i,", "j"],
        "f(",
    );
    let chunks = render_chunks(&doc, &PassthroughComments, &LayoutOptions::new(100)).unwrap();

    let starts: Vec<u32> = chunks.iter().filter_map(|c| c.span.map(|s| s.start)).collect();
    assert!(!starts.is_empty());
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn deep_chain_respects_branching_budget() {
    fn chain(src: &mut Src, depth: u32) -> Doc {
        if depth == 0 {
            return src.t("end");
        }
        let m = src.t(".m()");
        let rest = chain(src, depth - 1);
        Level::new(
            OpenOp {
                break_behaviour: BreakBehaviour::PreferBreakingLastInnerLevel {
                    keep_indent_when_inlined: false,
                },
                breakability_if_last_level: LastLevelBreakability::AcceptInlineChain,
                plus_indent: 2,
                ..OpenOp::default()
            },
            vec![unified("", 2), m, rest],
        )
        .into()
    }

    let mut src = Src::new();
    let head = src.t("recv");
    let tail = chain(&mut src, 40);
    let doc: Doc = Level::new(OpenOp::default(), vec![head, tail]).into();

    let mut options = LayoutOptions::new(10);
    options.record_explorations = true;
    let layout = layline::lay_out(&doc, &PassthroughComments, &options).unwrap();
    // The branching cap keeps the explored tree small even for a
    // pathological 40-deep chain.
    assert!(layout.obs().exploration_count() < 2000);

    let out = render(&doc, &PassthroughComments, &options).unwrap();
    assert!(out.starts_with("recv"));
    assert_eq!(out.matches(".m()").count(), 40);
    assert!(out.trim_end().ends_with("end"));
}

#[test]
fn preformatted_lines_are_a_fixed_point() {
    let first = {
        let mut src = Src::new();
        let doc = aosp_class(
            &mut src,
            &["a,", "b,", "c,", "d,", "e,", "f,", "g,", "h,", "i,", "j"],
            "f(",
        );
        render(&doc, &PassthroughComments, &LayoutOptions::new(100)).unwrap()
    };

    // A translator re-reading formatted output would hand back one token
    // per line with forced breaks between them.
    let mut src = Src::new();
    let mut kids = Vec::new();
    for (i, line) in first.lines().enumerate() {
        if i > 0 {
            kids.push(Break::forced().into());
        }
        kids.push(src.t(line));
    }
    let doc: Doc = Level::new(OpenOp::default(), kids).into();
    let second = render(&doc, &PassthroughComments, &LayoutOptions::new(100)).unwrap();
    assert_eq!(second, first);
}

#[test]
fn rendering_twice_is_deterministic() {
    let mut src = Src::new();
    let doc = aosp_class(
        &mut src,
        &["because,", "it,", "is,", "just,", "so,", "very,", "looong"],
        "wrappedCallThatIsRatherLong(",
    );
    let options = LayoutOptions::new(60);
    let a = render(&doc, &PassthroughComments, &options).unwrap();
    let b = render(&doc, &PassthroughComments, &options).unwrap();
    assert_eq!(a, b);
}
