// Label binding and direct calls within one code buffer.

use sable::value::encode_fixnum;

use crate::common::{atom, emit_program, fixnum, list, run_program, run_source};

fn code(formals: Vec<sable::AstNode>, body: sable::AstNode) -> sable::AstNode {
    list(vec![atom("code"), list(formals), body])
}

#[test]
fn empty_labels_jump_straight_to_the_body() {
    // (labels () 5)
    let node = list(vec![atom("labels"), list(vec![]), fixnum(5)]);
    assert_eq!(
        emit_program(&node),
        [
            0xe9, 0x00, 0x00, 0x00, 0x00, // jmp +0
            0x48, 0x89, 0xfe, // mov rsi, rdi
            0xb8, 0x14, 0x00, 0x00, 0x00, // mov eax, imm(5)
            0xc3,
        ]
    );
    assert_eq!(run_program(&node), encode_fixnum(5));
}

#[test]
fn unused_label_is_jumped_over() {
    // (labels ((const (code () 6))) 5)
    let bindings = list(vec![list(vec![atom("const"), code(vec![], fixnum(6))])]);
    let node = list(vec![atom("labels"), bindings, fixnum(5)]);
    assert_eq!(
        emit_program(&node),
        [
            0xe9, 0x06, 0x00, 0x00, 0x00, // jmp over the label body
            0xb8, 0x18, 0x00, 0x00, 0x00, // mov eax, imm(6)
            0xc3, //
            0x48, 0x89, 0xfe, // mov rsi, rdi
            0xb8, 0x14, 0x00, 0x00, 0x00, // mov eax, imm(5)
            0xc3,
        ]
    );
    assert_eq!(run_program(&node), encode_fixnum(5));
}

#[test]
fn labelcall_with_no_arguments() {
    // (labels ((const (code () 5))) (labelcall const))
    let bindings = list(vec![list(vec![atom("const"), code(vec![], fixnum(5))])]);
    let node = list(vec![
        atom("labels"),
        bindings,
        list(vec![atom("labelcall"), atom("const")]),
    ]);
    assert_eq!(
        emit_program(&node),
        [
            0xe9, 0x06, 0x00, 0x00, 0x00, // jmp to body
            0xb8, 0x14, 0x00, 0x00, 0x00, // const: mov eax, imm(5)
            0xc3, //
            0x48, 0x89, 0xfe, // mov rsi, rdi
            0xe8, 0xf2, 0xff, 0xff, 0xff, // call const
            0xc3,
        ]
    );
    assert_eq!(run_program(&node), encode_fixnum(5));
}

#[test]
fn labelcall_with_one_argument_returns_it() {
    // (labels ((id (code (x) x))) (labelcall id 5))
    let bindings = list(vec![list(vec![
        atom("id"),
        code(vec![atom("x")], atom("x")),
    ])]);
    let node = list(vec![
        atom("labels"),
        bindings,
        list(vec![atom("labelcall"), atom("id"), fixnum(5)]),
    ]);
    assert_eq!(
        emit_program(&node),
        [
            0xe9, 0x06, 0x00, 0x00, 0x00, // jmp to body
            0x48, 0x8b, 0x44, 0x24, 0xf8, // id: mov rax, [rsp-8]
            0xc3, //
            0x48, 0x89, 0xfe, // mov rsi, rdi
            0xb8, 0x14, 0x00, 0x00, 0x00, // mov eax, imm(5)
            0x48, 0x89, 0x44, 0x24, 0xf0, // mov [rsp-16], rax (skip ret slot)
            0xe8, 0xe8, 0xff, 0xff, 0xff, // call id
            0xc3,
        ]
    );
    assert_eq!(run_program(&node), encode_fixnum(5));
}

#[test]
fn labelcall_with_two_arguments() {
    // (labels ((add (code (x y) (+ x y)))) (labelcall add 1 2))
    let bindings = list(vec![list(vec![
        atom("add"),
        code(
            vec![atom("x"), atom("y")],
            list(vec![atom("+"), atom("x"), atom("y")]),
        ),
    ])]);
    let node = list(vec![
        atom("labels"),
        bindings,
        list(vec![atom("labelcall"), atom("add"), fixnum(1), fixnum(2)]),
    ]);
    assert_eq!(run_program(&node), encode_fixnum(3));
}

#[test]
fn later_labels_can_call_earlier_ones() {
    // (labels ((five (code () 5))
    //          (six (code () (add1 (labelcall five)))))
    //   (labelcall six))
    assert_eq!(
        run_source(
            "(labels ((five (code () 5))
                      (six (code () (add1 (labelcall five)))))
               (labelcall six))"
        ),
        encode_fixnum(6)
    );
}

#[test]
fn second_argument_lands_in_its_own_slot() {
    assert_eq!(
        run_source(
            "(labels ((second (code (x y) y)))
               (labelcall second 7 9))"
        ),
        encode_fixnum(9)
    );
}
