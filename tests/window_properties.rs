//! Property tests for the window arena and the fill algorithm.

use cursorwindow::common::config::{FIELD_SLOT_SIZE, MIN_WINDOW_SIZE};
use cursorwindow::cursor::MemoryCursor;
use cursorwindow::{Error, Paginator, Value, Window};
use proptest::prelude::*;

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        ".{0,24}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..48).prop_map(Value::Blob),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    AllocRow,
    PutLong(usize),
    PutBlob(usize, usize),
    FreeLastRow,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AllocRow),
        2 => (0..3usize).prop_map(Op::PutLong),
        2 => (0..3usize, 0..200usize).prop_map(|(c, n)| Op::PutBlob(c, n)),
        1 => Just(Op::FreeLastRow),
    ]
}

proptest! {
    /// Property: every value written can be read back unchanged.
    #[test]
    fn prop_values_round_trip(
        rows in proptest::collection::vec(proptest::collection::vec(value_strategy(), 3), 0..40)
    ) {
        let mut window = Window::create("prop", 64 * 1024).unwrap();
        window.set_num_columns(3).unwrap();

        for values in &rows {
            let row = window.alloc_row().unwrap();
            for (column, value) in values.iter().enumerate() {
                window.put_value(row, column, value).unwrap();
            }
        }

        prop_assert_eq!(window.num_rows(), rows.len());
        for (row, values) in rows.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                prop_assert_eq!(&window.get_value(row, column).unwrap().to_value(), value);
            }
        }
    }

    /// Property: the used size never exceeds capacity, and an out-of-memory
    /// failure changes nothing.
    #[test]
    fn prop_capacity_bound(
        capacity in MIN_WINDOW_SIZE..2048usize,
        ops in proptest::collection::vec(op_strategy(), 1..120)
    ) {
        let mut window = Window::create("prop", capacity).unwrap();
        window.set_num_columns(3).unwrap();

        for op in ops {
            let before = (window.used_bytes(), window.num_rows());
            let last = window.num_rows().checked_sub(1);

            let result = match (op, last) {
                (Op::AllocRow, _) => window.alloc_row().map(|_| ()),
                (Op::PutLong(column), Some(row)) => window.put_long(row, column, 1),
                (Op::PutBlob(column, len), Some(row)) => window.put_blob(row, column, &vec![9u8; len]),
                (Op::FreeLastRow, _) => window.free_last_row(),
                (_, None) => Ok(()),
            };

            match result {
                Err(Error::OutOfMemory { .. }) => {
                    prop_assert_eq!((window.used_bytes(), window.num_rows()), before);
                }
                Err(Error::NoRowToFree) | Ok(()) => {}
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
            prop_assert!(window.used_bytes() <= window.capacity());
        }
    }

    /// Property: a fill either holds the required row or reports that it
    /// cannot fit in an empty window.
    #[test]
    fn prop_fill_keeps_required_row(
        blob_sizes in proptest::collection::vec(0..160usize, 1..60),
        capacity in (MIN_WINDOW_SIZE + 2 * FIELD_SLOT_SIZE)..2048usize,
        required in any::<proptest::sample::Index>(),
        start in any::<proptest::sample::Index>(),
        count_all in any::<bool>(),
    ) {
        let n = blob_sizes.len();
        let required = required.index(n);
        let start = start.index(required + 1);

        let rows = blob_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| vec![Value::Integer(i as i64), Value::Blob(vec![i as u8; size])])
            .collect();
        let mut cursor = MemoryCursor::new(2, rows);
        let mut window = Window::create("prop", capacity).unwrap();

        let fits_alone = MIN_WINDOW_SIZE + 2 * FIELD_SLOT_SIZE + blob_sizes[required] <= capacity;

        match Paginator::new().fill(&mut cursor, &mut window, start, required, count_all) {
            Ok(result) => {
                prop_assert!(fits_alone);
                prop_assert!(result.start_pos >= start);
                prop_assert!(result.start_pos <= required);
                prop_assert!(required < result.start_pos + window.num_rows());
                if count_all {
                    prop_assert_eq!(result.counted_rows, n);
                }
                for row in 0..window.num_rows() {
                    let id = result.start_pos + row;
                    prop_assert_eq!(window.get_long(row, 0).unwrap(), id as i64);
                    prop_assert_eq!(window.get_blob(row, 1).unwrap().len(), blob_sizes[id]);
                }
            }
            Err(Error::RowTooLarge { row, .. }) => {
                prop_assert!(!fits_alone);
                prop_assert_eq!(row, required);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
        prop_assert_eq!(cursor.resets(), 1);
    }
}
