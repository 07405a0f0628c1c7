//! Property tests for menu navigation
//!
//! For any sequence of navigation inputs the selection stays inside the item
//! list, the page stays inside the page list, and the selection is always
//! visible on the current page. Moving past the ends clamps instead of
//! wrapping.

use proptest::prelude::*;

use lumen_runtime::MenuState;

#[derive(Debug, Clone, Copy)]
enum NavOp {
    Up,
    Down,
    PageLeft,
    PageRight,
}

fn nav_op() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        Just(NavOp::Up),
        Just(NavOp::Down),
        Just(NavOp::PageLeft),
        Just(NavOp::PageRight),
    ]
}

fn apply(menu: &mut MenuState, op: NavOp) {
    match op {
        NavOp::Up => menu.move_up(),
        NavOp::Down => menu.move_down(),
        NavOp::PageLeft => menu.page_left(),
        NavOp::PageRight => menu.page_right(),
    }
}

proptest! {
    #[test]
    fn selection_and_page_stay_in_bounds(
        item_count in 1usize..30,
        per_page in 1usize..8,
        ops in proptest::collection::vec(nav_op(), 0..200),
    ) {
        let mut menu = MenuState::new(item_count, per_page);

        for op in ops {
            apply(&mut menu, op);

            prop_assert!(menu.selected() < item_count);
            prop_assert!(menu.page() < menu.page_count());
            prop_assert!(
                menu.visible_range().contains(&menu.selected()),
                "selection {} not visible on page {} ({:?})",
                menu.selected(),
                menu.page(),
                menu.visible_range()
            );
        }
    }

    #[test]
    fn moving_past_the_ends_is_a_no_op(
        item_count in 1usize..30,
        per_page in 1usize..8,
    ) {
        let mut menu = MenuState::new(item_count, per_page);

        // Hammer the top: nothing moves.
        for _ in 0..3 {
            menu.move_up();
            prop_assert_eq!(menu.selected(), 0);
            prop_assert_eq!(menu.page(), 0);
        }

        // Walk to the bottom, then hammer it: position is stable.
        for _ in 0..item_count {
            menu.move_down();
        }
        let at_end = (menu.selected(), menu.page());
        for _ in 0..3 {
            menu.move_down();
            prop_assert_eq!((menu.selected(), menu.page()), at_end);
        }
        prop_assert_eq!(menu.selected(), item_count - 1);
    }
}
