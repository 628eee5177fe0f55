use as2js_ast::{NodeError, Position};
use pretty_assertions::assert_eq;

fn counters(position: &Position) -> (i32, i32, i32, i32) {
    (
        position.page(),
        position.page_line(),
        position.paragraph(),
        position.line(),
    )
}

#[test]
fn a_page_break_leaves_the_absolute_line_alone() {
    let mut position = Position::new("long.js");
    assert_eq!(counters(&position), (1, 1, 1, 1));

    for _ in 0..999 {
        position.new_line();
    }
    assert_eq!(counters(&position), (1, 1000, 1, 1000));

    position.new_paragraph();
    position.new_paragraph();
    assert_eq!(position.paragraph(), 3);

    position.new_page();
    assert_eq!(counters(&position), (2, 1, 1, 1000));

    position.new_line();
    assert_eq!(counters(&position), (2, 2, 1, 1001));
}

#[test]
fn counters_can_be_rebased_on_a_valid_line() {
    let mut position = Position::new("included.js");
    position.new_page();
    position.new_line();

    position.reset_counters(40).unwrap();
    assert_eq!(counters(&position), (1, 1, 1, 40));

    assert!(matches!(
        position.reset_counters(0),
        Err(NodeError::InvalidLine { line: 0 })
    ));
    assert_eq!(position.line(), 40);
    assert_eq!(position.filename(), "included.js");
}
