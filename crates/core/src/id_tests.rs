use super::*;

#[test]
fn short_truncates_on_char_boundary() {
    assert_eq!("abcdefgh".short(4), "abcd");
    assert_eq!("ab".short(4), "ab");
}

#[test]
fn task_id_compares_against_str() {
    let id = TaskId::new("task-1");
    assert_eq!(id, *"task-1");
    assert_eq!(id.as_str(), "task-1");
    assert_eq!(id.to_string(), "task-1");
}

#[test]
fn sequential_id_gen_is_deterministic_and_increasing() {
    let gen = SequentialIdGen::default();
    assert_eq!(gen.next("shepherd"), "shepherd-0");
    assert_eq!(gen.next("shepherd"), "shepherd-1");
}

#[test]
fn uuid_id_gen_produces_distinct_ids() {
    let gen = UuidIdGen;
    assert_ne!(gen.next("task"), gen.next("task"));
}
