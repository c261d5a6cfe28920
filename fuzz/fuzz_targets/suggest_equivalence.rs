#![no_main]

use avl_suggest::model::SuggestInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: SuggestInput| {
    avl_suggest::model::run_suggest_equivalence(input);
});
