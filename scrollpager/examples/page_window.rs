// Example: walk through pages of a growing list and print the button bar.
use scrollpager::{PagerOptions, PaginationState};

fn main() {
    let mut state = PaginationState::new(PagerOptions::default()).recompute(42);

    for page in 1..=state.total_pages() {
        state = state.go_to(page);
        let labels: Vec<String> = state
            .window_spec()
            .buttons
            .iter()
            .map(|b| if b.active { format!("[{}]", b.label()) } else { b.label() })
            .collect();
        println!("page {page}: items {:?} | {}", state.page_slice(), labels.join(" "));
    }

    // More items arrive while the user sits on the last page: the page number is kept.
    state = state.recompute(300);
    println!(
        "after growth: page {} of {}, window {:?}",
        state.current_page(),
        state.total_pages(),
        state.page_window()
    );
}
