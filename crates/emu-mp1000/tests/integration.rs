//! Integration tests for the MP-1000.
//!
//! Each test assembles a tiny BIOS by hand, so no ROM files are needed.
//! Programs start at $F800 and the reset vector points there.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use emu_core::{Observable, Tickable, Value};
use emu_mp1000::{
    BIOS_SIZE, ControllerKey, Debugger, Mp1000, Mp1000Config, Mp1000Key, Player, TICKS_PER_FRAME,
    TICKS_PER_LINE,
};
use motorola_6800::pins::IRQ;
use motorola_6800::status::{N, Z};
use motorola_6821::ctrl::IRQ1;
use motorola_6847::{DISPLAY_START, palette};

fn bios(program: &[u8]) -> Vec<u8> {
    let mut bios = vec![0u8; BIOS_SIZE];
    bios[..program.len()].copy_from_slice(program);
    bios[BIOS_SIZE - 2] = 0xF8;
    bios[BIOS_SIZE - 1] = 0x00;
    bios
}

fn make_mp1000(program: &[u8]) -> Mp1000 {
    Mp1000::new(&Mp1000Config {
        bios: bios(program),
        ..Mp1000Config::default()
    })
    .expect("valid config")
}

fn run(mp: &mut Mp1000, ticks: u64) {
    for _ in 0..ticks {
        mp.tick();
    }
}

// ---------------------------------------------------------------------------
// CPU through the system bus
// ---------------------------------------------------------------------------

#[test]
fn reset_vector_then_load_immediate() {
    // LDAA #$42; JMP *
    let mut mp = make_mp1000(&[0x86, 0x42, 0x7E, 0xF8, 0x02]);
    run(&mut mp, 100);

    let cpu = mp.cpu();
    assert_eq!(cpu.regs.a, 0x42);
    assert!(!cpu.regs.cc.is_set(N));
    assert!(!cpu.regs.cc.is_set(Z));
    assert!((0xF802..=0xF805).contains(&cpu.regs.pc));
}

#[test]
fn core_ram_is_mirrored_on_the_bus() {
    // LDAA #$5A; STAA $0010; LDAB $0410; STAA $1C20; JMP *
    let mut mp = make_mp1000(&[
        0x86, 0x5A, 0xB7, 0x00, 0x10, 0xF6, 0x04, 0x10, 0xB7, 0x1C, 0x20, 0x7E, 0xF8, 0x0B,
    ]);
    run(&mut mp, 200);

    assert_eq!(mp.cpu().regs.b, 0x5A);
    assert_eq!(mp.memory().read(0x0020), 0x5A);
    assert_eq!(mp.query("memory.$0C20"), Some(Value::U8(0x5A)));
}

#[test]
fn expansion_ram_holds_the_stack() {
    // LDS #$BFFF; LDAA #$33; PSHA; JMP *
    let mut mp = make_mp1000(&[0x8E, 0xBF, 0xFF, 0x86, 0x33, 0x36, 0x7E, 0xF8, 0x06]);
    run(&mut mp, 100);

    assert_eq!(mp.cpu().regs.sp, 0xBFFE);
    assert_eq!(mp.memory().read(0xBFFF), 0x33);
}

#[test]
fn external_io_reads_ff() {
    // LDAA $6400; JMP *
    let mut mp = make_mp1000(&[0xB6, 0x64, 0x00, 0x7E, 0xF8, 0x03]);
    run(&mut mp, 100);
    assert_eq!(mp.cpu().regs.a, 0xFF);
}

// ---------------------------------------------------------------------------
// PIA interrupts and input
// ---------------------------------------------------------------------------

#[test]
fn field_sync_edge_raises_and_control_read_clears_irq() {
    // LDAA #$07; STAA $2003   CRB: CB1 IRQ on rising edge, data register
    // LDS #$01FF; CLI; BRA *
    // handler: LDAB $2003; RTI
    let mut program = bios(&[
        0x86, 0x07, 0xB7, 0x20, 0x03, 0x8E, 0x01, 0xFF, 0x0E, 0x20, 0xFE, 0xF6, 0x20, 0x03, 0x3B,
    ]);
    program[BIOS_SIZE - 8] = 0xF8;
    program[BIOS_SIZE - 7] = 0x0B;
    let mut mp = Mp1000::new(&Mp1000Config {
        bios: program,
        ..Mp1000Config::default()
    })
    .expect("valid config");

    let mut raised = false;
    for _ in 0..2 * TICKS_PER_FRAME {
        mp.tick();
        if mp.pins().any(IRQ) {
            raised = true;
            break;
        }
    }
    assert!(raised, "FS edge never raised IRQ");
    assert_eq!(mp.query("pia1.irqb"), Some(Value::Bool(true)));
    assert_eq!(mp.query("pia1.irq"), Some(Value::Bool(true)));
    assert_eq!(mp.vdg().line(), 230);

    let mut cleared = false;
    for _ in 0..40 {
        mp.tick();
        if !mp.pins().any(IRQ) {
            cleared = true;
            break;
        }
    }
    assert!(cleared, "IRQ still asserted after the handler ran");
    // Dropped on the control register read itself.
    assert_eq!(mp.pins().addr(), 0x2003);
    assert_eq!(mp.pia1().pb.ctrl & IRQ1, 0);
    assert_eq!(mp.query("pia1.irq"), Some(Value::Bool(false)));

    run(&mut mp, 40);
    assert!(!mp.pins().any(IRQ));
    let regs = mp.cpu().regs;
    assert_eq!(regs.b, 0x87);
    assert_eq!(regs.sp, 0x01FF);
    assert!((0xF809..=0xF80B).contains(&regs.pc));
}

/// Configure a PIA at `base` (DDRB all out, both sides on data), select a
/// row with port B and keep reading port A into B.
fn scan_program(base: u16, port_b: u8) -> Vec<u8> {
    let [hi, lo] = base.to_be_bytes();
    vec![
        0x86, 0xFF, 0xB7, hi, lo + 2, // DDRB = $FF
        0x86, 0x04, 0xB7, hi, lo + 3, // CRB = PR
        0xB7, hi, lo + 1, // CRA = PR
        0x86, port_b, 0xB7, hi, lo + 2, // PB = row select
        0xF6, hi, lo, // LDAB port A
        0x20, 0xFB, // BRA back to the LDAB
    ]
}

#[test]
fn controller_keys_read_through_pia1() {
    let mut mp = make_mp1000(&scan_program(0x2000, 0x0D));
    mp.key_down(Mp1000Key::Controller(Player::One, ControllerKey::Num4));
    mp.key_down(Mp1000Key::Controller(Player::Two, ControllerKey::Clear));
    // Row 2; not selected.
    mp.key_down(Mp1000Key::Controller(Player::One, ControllerKey::Num2));
    run(&mut mp, 200);

    assert_eq!(mp.cpu().regs.b, 0x7D);
    assert_eq!(mp.query("graphics"), Some(Value::Bool(false)));
}

#[test]
fn keyboard_keys_read_through_pia2() {
    let mut mp = make_mp1000(&scan_program(0x6000, 0xFE));
    mp.key_down(Mp1000Key::Keyboard(b'A'));
    run(&mut mp, 200);
    assert_eq!(mp.cpu().regs.b, 0xFD);
}

#[test]
fn released_key_reads_high() {
    let mut mp = make_mp1000(&scan_program(0x6000, 0xFE));
    mp.key_down(Mp1000Key::Keyboard(b'A'));
    mp.exec(50_000);
    assert_eq!(mp.cpu().regs.b, 0xFD);

    mp.key_up(Mp1000Key::Keyboard(b'A'));
    run(&mut mp, 50);
    assert_eq!(mp.cpu().regs.b, 0xFF);
}

#[test]
fn quick_tap_is_still_seen() {
    let mut mp = make_mp1000(&scan_program(0x6000, 0xFE));
    mp.key_down(Mp1000Key::Keyboard(b'a'));
    mp.key_up(Mp1000Key::Keyboard(b'a'));
    run(&mut mp, 200);
    assert_eq!(mp.cpu().regs.b, 0xFD);

    mp.exec(40_000);
    run(&mut mp, 50);
    assert_eq!(mp.cpu().regs.b, 0xFF);
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// First framebuffer pixel of the display area on glyph row `row`.
fn display_pixel(row: usize) -> usize {
    (25 + row) * 512 + 32
}

#[test]
fn alphanumeric_screen_from_core_ram() {
    let mut mp = make_mp1000(&[0x20, 0xFE]);
    // 'A', inverse 'A', semigraphics block.
    mp.memory_mut().write(0x0200, 0x01);
    mp.memory_mut().write(0x0201, 0x41);
    mp.memory_mut().write(0x0202, 0x80 | 0x30 | 0x0F);
    mp.run_frame();
    mp.run_frame();

    let fb = mp.framebuffer();
    let row = display_pixel(3);
    assert_eq!(fb[row], palette::ALNUM_DARK_GREEN);
    assert_eq!(fb[row + 4], palette::ALNUM_GREEN);
    assert_eq!(fb[row + 8], palette::ALNUM_GREEN);
    assert_eq!(fb[row + 12], palette::ALNUM_DARK_GREEN);
    assert_eq!(fb[row + 16], palette::RED);
    // Alphanumeric border is black.
    assert_eq!(fb[0], palette::BLACK);
}

#[test]
fn pia1_switches_vdg_to_graphics() {
    // DDRB = $FF; CRB = PR; PB = $8F (A/G, rows idle)
    let mut mp = make_mp1000(&[
        0x86, 0xFF, 0xB7, 0x20, 0x02, 0x86, 0x04, 0xB7, 0x20, 0x03, 0x86, 0x8F, 0xB7, 0x20,
        0x02, 0x7E, 0xF8, 0x0F,
    ]);
    mp.run_frame();
    mp.run_frame();

    assert_eq!(mp.query("graphics"), Some(Value::Bool(true)));
    assert_eq!(mp.query("vdg.mode"), Some(Value::String("Cg6".to_string())));
    let fb = mp.framebuffer();
    assert_eq!(fb[0], palette::GREEN);
    assert_eq!(fb[display_pixel(0)], palette::GREEN);
}

#[test]
fn graphics_scanline_fetches_wrap_core_ram() {
    // DDRB = $FF; CRB = PR; PB = $8F (A/G: CG6, 32 bytes per line)
    let mut mp = make_mp1000(&[
        0x86, 0xFF, 0xB7, 0x20, 0x02, 0x86, 0x04, 0xB7, 0x20, 0x03, 0x86, 0x8F, 0xB7, 0x20,
        0x02, 0x7E, 0xF8, 0x0F,
    ]);
    mp.run_frame();
    mp.run_frame();
    assert_eq!(mp.query("vdg.mode"), Some(Value::String("Cg6".to_string())));
    for i in 0..0x20u8 {
        mp.memory_mut().write(u16::from(i), 0x40 + i);
    }

    // Display line 16 starts at VDG address 512, one full 1 KB wrap past
    // the $0200 base.
    let target = DISPLAY_START + 16;
    let mut guard = 0;
    while mp.vdg().line() != target - 1 {
        mp.tick();
        guard += 1;
        assert!(guard < TICKS_PER_FRAME, "never reached line {}", target - 1);
    }

    let fetches = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&fetches);
    mp.set_vdg_watch(Some(Box::new(move |addr, byte| {
        log.borrow_mut().push((addr, byte));
    })));
    run(&mut mp, TICKS_PER_LINE);
    mp.set_vdg_watch(None);

    assert_eq!(mp.vdg().line(), target);
    let fetches = fetches.borrow();
    assert_eq!(fetches.len(), 32);
    for (i, &(addr, byte)) in fetches.iter().enumerate() {
        assert_eq!(addr, 512 + i as u16);
        assert_eq!(byte, 0x40 + i as u8, "VDG ${addr:04X}");
    }
}

// ---------------------------------------------------------------------------
// Cartridges, reset, exec
// ---------------------------------------------------------------------------

#[test]
fn cartridge_runs_from_8000() {
    // BIOS: JMP $8000. Cartridge: LDAA #$77; JMP *
    let mut mp = make_mp1000(&[0x7E, 0x80, 0x00]);
    let mut cart = vec![0u8; 0x800];
    cart[..5].copy_from_slice(&[0x86, 0x77, 0x7E, 0x80, 0x02]);
    mp.insert_cartridge(cart).expect("2 KB cartridge");
    assert!(mp.memory().has_cartridge());
    run(&mut mp, 100);

    assert_eq!(mp.cpu().regs.a, 0x77);
    assert_eq!(mp.memory().read(0x9800), 0x86);

    mp.remove_cartridge();
    assert_eq!(mp.memory().read(0x8000), 0xFF);
    assert!(!mp.memory().has_cartridge());
}

#[test]
fn bad_cartridge_size_is_rejected() {
    let mut mp = make_mp1000(&[0x20, 0xFE]);
    let err = mp.insert_cartridge(vec![0; 100]).unwrap_err();
    assert!(err.contains("100"), "{err}");
}

#[test]
fn bad_bios_is_rejected() {
    let result = Mp1000::new(&Mp1000Config {
        bios: vec![0; 1024],
        ..Mp1000Config::default()
    });
    assert!(result.is_err());
}

#[test]
fn reset_keeps_ram_and_reruns_bios() {
    // INC $0030; JMP *
    let mut mp = make_mp1000(&[0x7C, 0x00, 0x30, 0x7E, 0xF8, 0x03]);
    run(&mut mp, 100);
    assert_eq!(mp.memory().read(0x0030), 1);

    mp.reset();
    assert_eq!(mp.query("cpu.pc"), Some(Value::U16(0)));
    run(&mut mp, 100);
    assert_eq!(mp.memory().read(0x0030), 2);
}

#[test]
fn exec_runs_whole_ticks() {
    let mut mp = make_mp1000(&[0x20, 0xFE]);
    assert_eq!(mp.exec(1_000), 894);
    assert_eq!(mp.ticks(), 894);
}

#[test]
fn debugger_sees_every_tick_and_can_stop() {
    let mut mp = make_mp1000(&[0x20, 0xFE]);
    let stopped = Rc::new(Cell::new(false));
    let seen = Rc::new(Cell::new(0u32));

    let (stop, count) = (Rc::clone(&stopped), Rc::clone(&seen));
    mp.set_debugger(Some(Debugger {
        callback: Box::new(move |_pins| {
            count.set(count.get() + 1);
            if count.get() == 10 {
                stop.set(true);
            }
        }),
        stopped: Rc::clone(&stopped),
    }));

    assert_eq!(mp.exec(1_000), 10);
    assert_eq!(seen.get(), 10);

    stopped.set(false);
    assert_eq!(mp.exec(1_000), 894);
    assert_eq!(seen.get(), 904);
}
