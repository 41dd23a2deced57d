#[macro_use]
extern crate expectest;

use expectest::prelude::*;

const VECTORS_X: &str = include_str!("../src/hal/imxrt1064/vectors.x");

#[test]
fn boot_path_section_sits_outside_text() {
    expect!(VECTORS_X.contains("*(.init_text .init_text.*)")).to(be_true());
    expect!(VECTORS_X.contains("} INSERT AFTER .text;")).to(be_true());
}

#[test]
fn section_copy_symbols_are_provided() {
    for symbol in [
        "__TEXT_ROM",
        "__text_start__",
        "__text_end__",
        "__DATA_ROM",
        "__data_start__",
        "__data_end__",
    ].iter() {
        expect!(VECTORS_X.contains(&format!("PROVIDE({} = ", symbol))).to(be_true());
    }
}

#[test]
fn vector_table_alignment_follows_its_size() {
    expect!(VECTORS_X.contains("__VECTOR_RAM % __RAM_VECTOR_TABLE_SIZE_BYTES == 0")).to(be_true());
}
