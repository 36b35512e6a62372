//! x86-64 instruction catalog
//!
//! Each method appends one instruction form to a [`BufferWriter`]. The
//! encodings are bit-exact: tests compare generated code against literal
//! byte sequences, so the short forms (the `rax`-destination immediates)
//! and the SIB/displacement choices here are part of the contract, not an
//! implementation detail.
//!
//! Opcode references: <http://ref.x86asm.net/coder64.html> and
//! <https://www.felixcloutier.com/x86/>.

use super::buffer::BufferWriter;

/// General-purpose registers, numbered as the hardware numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Rax = 0,
    Rcx = 1,
    Rdx = 2,
    Rbx = 3,
    Rsp = 4,
    Rbp = 5,
    Rsi = 6,
    Rdi = 7,
}

impl Register {
    #[inline]
    fn index(self) -> u8 {
        self as u8
    }
}

/// Branch conditions. Only equality is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Equal,
}

/// REX prefix selecting 64-bit operand size.
const REX_W: u8 = 0x48;

/// Two's-complement byte for a signed 8-bit displacement.
fn encode_disp8(disp: i32) -> u8 {
    assert!((-128..=127).contains(&disp), "displacement out of disp8 range");
    disp as i8 as u8
}

impl BufferWriter<'_> {
    pub fn inc_reg(&mut self, reg: Register) {
        self.write8(REX_W);
        self.write8(0xff);
        self.write8(0xc0 + reg.index());
    }

    pub fn dec_reg(&mut self, reg: Register) {
        self.write8(REX_W);
        self.write8(0xff);
        self.write8(0xc8 + reg.index());
    }

    /// `mov r32, imm32` - zero-extends into the full register.
    pub fn mov_reg_imm32(&mut self, dst: Register, src: i32) {
        self.write8(0xb8 + dst.index());
        self.write32(src);
    }

    /// `mov r64, r64`
    pub fn mov_reg_reg(&mut self, dst: Register, src: Register) {
        self.write8(REX_W);
        self.write8(0x89);
        self.write8(0xc0 + dst.index() + src.index() * 8);
    }

    pub fn add_reg_imm32(&mut self, dst: Register, src: i32) {
        if dst == Register::Rax {
            // add eax, {imm32} has a short form: 05 {imm32}.
            self.write8(0x05);
        } else {
            self.write8(0x81);
            self.write8(0xc0 + dst.index());
        }
        self.write32(src);
    }

    pub fn sub_reg_imm32(&mut self, dst: Register, src: i32) {
        if dst == Register::Rax {
            // sub eax, {imm32} has a short form: 2d {imm32}.
            self.write8(0x2d);
        } else {
            self.write8(0x83);
            self.write8(0xe8 + dst.index());
        }
        self.write32(src);
    }

    pub fn and_reg_imm32(&mut self, dst: Register, value: i32) {
        self.write8(REX_W);
        if dst == Register::Rax {
            // and rax, {imm32} has a short form: 48 25 {imm32}.
            self.write8(0x25);
            self.write32(value);
            return;
        }
        self.write8(0x81);
        self.write8(0xe0 + dst.index());
        self.write32(value);
    }

    pub fn or_reg_imm32(&mut self, dst: Register, value: i32) {
        self.write8(REX_W);
        if dst == Register::Rax {
            // or rax, {imm32} has a short form: 48 0d {imm32}.
            self.write8(0x0d);
            self.write32(value);
            return;
        }
        self.write8(0x81);
        self.write8(0xc8 + dst.index());
        self.write32(value);
    }

    pub fn cmp_reg_imm32(&mut self, dst: Register, value: i32) {
        self.write8(REX_W);
        if dst == Register::Rax {
            // cmp rax, {imm32} has a short form: 48 3d {imm32}.
            self.write8(0x3d);
            self.write32(value);
            return;
        }
        self.write8(0x81);
        self.write8(0xf8 + dst.index());
        self.write32(value);
    }

    pub fn shl_reg_imm8(&mut self, dst: Register, bits: i32) {
        assert!((0..64).contains(&bits), "shift amount out of range");
        self.write8(REX_W);
        self.write8(0xc1);
        self.write8(0xe0 + dst.index());
        self.write8(bits as u8);
    }

    pub fn shr_reg_imm8(&mut self, dst: Register, bits: i32) {
        assert!((0..64).contains(&bits), "shift amount out of range");
        self.write8(REX_W);
        self.write8(0xc1);
        self.write8(0xe8 + dst.index());
        self.write8(bits as u8);
    }

    /// `setcc al`
    pub fn setcc_al(&mut self, cond: Condition) {
        match cond {
            Condition::Equal => {
                self.write8(0x0f);
                self.write8(0x94);
                self.write8(0xc0);
            }
        }
    }

    /// `je rel32` - the displacement is usually a placeholder that a later
    /// backpatch replaces.
    pub fn je_imm32(&mut self, disp: i32) {
        assert!(disp > 0, "negative je displacement unimplemented");
        self.write8(0x0f);
        self.write8(0x84);
        self.write32(disp);
    }

    /// `jmp rel32` - same placeholder discipline as [`Self::je_imm32`].
    pub fn jmp_imm32(&mut self, disp: i32) {
        assert!(disp > 0, "negative jmp displacement unimplemented");
        self.write8(0xe9);
        self.write32(disp);
    }

    /// `call rel32`, where `disp` is measured from the start of the call
    /// instruction. The stored rel32 is relative to the end, so the
    /// instruction's own length is subtracted here.
    pub fn call_imm32(&mut self, disp: i32) {
        let disp = disp - 5;
        self.write8(0xe8);
        self.write32(disp);
    }

    pub fn ret(&mut self) {
        self.write8(0xc3);
    }

    /// `mov [rsp+offset], r64` - spill to a scratch slot. Only the slots
    /// below the stack pointer are used, so `offset` must be negative.
    pub fn mov_reg_to_stack(&mut self, src: Register, offset: i32) {
        assert!(offset < 0, "positive stack offset unimplemented");
        self.write8(REX_W);
        self.write8(0x89);
        self.write8(0x04 + src.index() * 8 + if offset == 0 { 0 } else { 0x40 });
        self.write8(0x24);
        self.write8(encode_disp8(offset));
    }

    /// `mov r64, [rsp+offset]` - reload from a scratch slot.
    pub fn mov_stack_to_reg(&mut self, dst: Register, offset: i32) {
        assert!(offset < 0, "positive stack offset unimplemented");
        self.write8(REX_W);
        self.write8(0x8b);
        self.write8(0x04 + dst.index() * 8 + if offset == 0 { 0 } else { 0x40 });
        self.write8(0x24);
        self.write8(encode_disp8(offset));
    }

    /// `add r64, [rsp+offset]`
    pub fn add_reg_stack(&mut self, dst: Register, offset: i32) {
        assert!(offset < 0, "positive stack offset unimplemented");
        self.write8(REX_W);
        self.write8(0x03);
        self.write8(0x04 + dst.index() * 8 + if offset == 0 { 0 } else { 0x40 });
        self.write8(0x24);
        self.write8(encode_disp8(offset));
    }

    /// `sub r64, [rsp+offset]`
    pub fn sub_reg_stack(&mut self, dst: Register, offset: i32) {
        assert!(offset < 0, "positive stack offset unimplemented");
        self.write8(REX_W);
        self.write8(0x2b);
        self.write8(0x04 + dst.index() * 8 + if offset == 0 { 0 } else { 0x40 });
        self.write8(0x24);
        self.write8(encode_disp8(offset));
    }

    /// `mov [base+disp], rax` - store the accumulator through a base
    /// register with an 8-bit displacement.
    pub fn mov_rax_to_reg_disp(&mut self, base: Register, disp: i32) {
        self.write8(REX_W);
        self.write8(0x89);
        self.write8(0x40 + base.index());
        self.write8(encode_disp8(disp));
    }

    /// `mov rax, [base+disp]`
    pub fn mov_reg_disp_to_rax(&mut self, base: Register, disp: i32) {
        self.write8(REX_W);
        self.write8(0x8b);
        self.write8(0x40 + base.index());
        self.write8(encode_disp8(disp));
    }
}
