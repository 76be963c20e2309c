//! Structural validation of the XML document shape.

use tacit::{ErrorKind, Opcode, Program};

fn load_err(source: &str) -> ErrorKind {
    Program::parse(source).expect_err("load should fail").kind()
}

fn wrap(body: &str) -> String {
    format!("<program>{body}</program>")
}

#[test]
fn xml_syntax_error_is_a_structure_error() {
    assert_eq!(load_err("<program><instruction"), ErrorKind::SourceStructure);
}

#[test]
fn root_must_be_program() {
    assert_eq!(load_err("<prog></prog>"), ErrorKind::SourceStructure);
}

#[test]
fn root_children_must_be_instructions() {
    assert_eq!(load_err(&wrap("<note>hi</note>")), ErrorKind::SourceStructure);
}

#[test]
fn missing_order_attribute() {
    assert_eq!(
        load_err(&wrap(r#"<instruction opcode="BREAK"></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn missing_opcode_attribute() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1"></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn empty_opcode_attribute() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="  "></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn order_must_be_positive() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="0" opcode="BREAK"></instruction>"#)),
        ErrorKind::SourceStructure
    );
    assert_eq!(
        load_err(&wrap(r#"<instruction order="-3" opcode="BREAK"></instruction>"#)),
        ErrorKind::SourceStructure
    );
    assert_eq!(
        load_err(&wrap(r#"<instruction order="two" opcode="BREAK"></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn duplicate_orders_are_rejected() {
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="BREAK"></instruction>
               <instruction order="1" opcode="BREAK"></instruction>"#
        )),
        ErrorKind::SourceStructure
    );
}

#[test]
fn unknown_opcode_is_rejected() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="NOP"></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn opcode_attribute_is_case_insensitive() {
    let program = Program::parse(&wrap(r#"<instruction order="1" opcode="bReAk"></instruction>"#)).unwrap();
    assert_eq!(program.instruction_at(1).unwrap().opcode, Opcode::Break);
}

#[test]
fn arg_gaps_are_rejected() {
    // arg3 without arg2
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="ADD">
                 <arg1 type="var">GF@x</arg1>
                 <arg3 type="int">1</arg3>
               </instruction>"#
        )),
        ErrorKind::SourceStructure
    );
    // arg2 without arg1
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="WRITE"><arg2 type="int">1</arg2></instruction>"#
        )),
        ErrorKind::SourceStructure
    );
}

#[test]
fn duplicate_arg_slots_are_rejected() {
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="WRITE">
                 <arg1 type="int">1</arg1>
                 <arg1 type="int">2</arg1>
               </instruction>"#
        )),
        ErrorKind::SourceStructure
    );
}

#[test]
fn unknown_children_of_instruction_are_ignored() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE">
             <arg1 type="int">1</arg1>
             <comment>ignored</comment>
           </instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.instruction_at(1).unwrap().args.len(), 1);
}

#[test]
fn argument_needs_a_type_attribute() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="WRITE"><arg1>1</arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn unknown_argument_type_is_rejected() {
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="WRITE"><arg1 type="double">1.0</arg1></instruction>"#
        )),
        ErrorKind::SourceStructure
    );
}

#[test]
fn int_lexeme_must_be_numeric() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="WRITE"><arg1 type="int">1x</arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="WRITE"><arg1 type="int"></arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn int_lexeme_accepts_sign_and_whitespace() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="int"> +42 </arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.instruction_at(1).unwrap().args[0], tacit::Arg::Int(42));
}

#[test]
fn bool_lexeme_must_be_exact() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="WRITE"><arg1 type="bool">TRUE</arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn nil_lexeme_is_ignored() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="nil">whatever</arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.instruction_at(1).unwrap().args[0], tacit::Arg::Nil);
}

#[test]
fn variable_lexemes_are_validated() {
    for lexeme in ["GF", "XF@a", "GF@", "gf@a", "@a"] {
        let body = format!(r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">{lexeme}</arg1></instruction>"#);
        assert_eq!(load_err(&wrap(&body)), ErrorKind::SourceStructure, "lexeme {lexeme:?}");
    }
}

#[test]
fn variable_name_may_contain_at_signs() {
    // Only the first @ separates the frame prefix.
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a@b</arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(
        program.instruction_at(1).unwrap().args[0],
        tacit::Arg::Var(tacit::FrameKind::Global, "a@b".to_owned())
    );
}

#[test]
fn empty_label_is_rejected() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="JUMP"><arg1 type="label"></arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn label_opcode_requires_a_label_argument() {
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="LABEL"><arg1 type="var">GF@x</arg1></instruction>"#)),
        ErrorKind::SourceStructure
    );
    assert_eq!(
        load_err(&wrap(r#"<instruction order="1" opcode="LABEL"></instruction>"#)),
        ErrorKind::SourceStructure
    );
}

#[test]
fn read_type_selector_is_validated() {
    assert_eq!(
        load_err(&wrap(
            r#"<instruction order="1" opcode="READ"><arg1 type="var">GF@x</arg1><arg2 type="type">float</arg2></instruction>"#
        )),
        ErrorKind::SourceStructure
    );
}

#[test]
fn label_table_maps_names_to_orders() {
    let program = Program::parse(&wrap(
        r#"<instruction order="3" opcode="LABEL"><arg1 type="label">a</arg1></instruction>
           <instruction order="9" opcode="LABEL"><arg1 type="label">b</arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.label_target("a"), Some(3));
    assert_eq!(program.label_target("b"), Some(9));
    assert_eq!(program.label_target("c"), None);
    assert_eq!(program.last_order(), 9);
    assert_eq!(program.len(), 2);
    assert!(program.instruction_at(4).is_none());
}

#[test]
fn program_attributes_are_ignored() {
    let program = Program::parse(
        r#"<program language="tacit"><instruction order="1" opcode="BREAK"></instruction></program>"#,
    )
    .unwrap();
    assert_eq!(program.len(), 1);
}

#[test]
fn string_text_is_trimmed_before_decoding() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">
            abc
        </arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.instruction_at(1).unwrap().args[0], tacit::Arg::Str("abc".to_owned()));
}

#[test]
fn backslash_without_three_digits_stays_literal() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">a\12b\xyz</arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(
        program.instruction_at(1).unwrap().args[0],
        tacit::Arg::Str("a\\12b\\xyz".to_owned())
    );
}

#[test]
fn escape_for_backslash_itself() {
    let program = Program::parse(&wrap(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">a\092b</arg1></instruction>"#,
    ))
    .unwrap();
    assert_eq!(program.instruction_at(1).unwrap().args[0], tacit::Arg::Str("a\\b".to_owned()));
}
