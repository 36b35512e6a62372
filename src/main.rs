use std::io::Read;
use std::process;

use sable::jit::{Buffer, BufferWriter, CompiledCode};
use sable::value::{
    decode_bool, decode_char, decode_fixnum, is_bool, is_char, is_fixnum, is_nil, is_pair,
};
use sable::{compile_program, read_str, CompilerContext};

const CODE_LEN: usize = 64 * 1024;
const HEAP_WORDS: usize = 512;

fn render(word: u64) -> String {
    if is_fixnum(word) {
        decode_fixnum(word).to_string()
    } else if is_bool(word) {
        if decode_bool(word) {
            "#t".to_string()
        } else {
            "#f".to_string()
        }
    } else if is_char(word) {
        format!("#\\{}", decode_char(word))
    } else if is_nil(word) {
        "()".to_string()
    } else if is_pair(word) {
        format!("#<pair {:#x}>", word)
    } else {
        format!("{:#x}", word)
    }
}

fn main() {
    let mut dump = false;
    let mut source: Option<String> = None;
    for arg in std::env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
        } else {
            source = Some(arg);
        }
    }

    let source = source.unwrap_or_else(|| {
        let mut text = String::new();
        if std::io::stdin().read_to_string(&mut text).is_err() {
            eprintln!("could not read program from stdin");
            process::exit(1);
        }
        text
    });

    let node = match read_str(&source) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Read error: {}", e);
            process::exit(1);
        }
    };

    let mut buf = Buffer::new(CODE_LEN);
    let bytes = {
        let mut writer = BufferWriter::new(&mut buf);
        let mut ctx = CompilerContext::new(&mut writer);
        // The compiler already printed a diagnostic on failure.
        if compile_program(&mut ctx, &node).is_err() {
            process::exit(1);
        }
        writer.hex_dump()
    };

    if dump {
        println!("{}", bytes);
        return;
    }

    if let Err(e) = buf.make_executable() {
        eprintln!("could not make code executable: {}", e);
        process::exit(1);
    }

    let mut heap = vec![0u64; HEAP_WORDS];
    let code = CompiledCode::new(buf);
    let result = unsafe { code.call(heap.as_mut_ptr() as u64) };
    println!("{}", render(result));
}
