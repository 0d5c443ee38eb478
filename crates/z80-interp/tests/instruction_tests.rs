//! Instruction behaviour and timing through the public CPU interface.

mod common;

use common::{TestBus, cpu_with, run_until_halt, step};
use z80_interp::{CF, CycleTable, HF, NF, PF, SF, XF, YF, Z80, ZF};

#[test]
fn test_reset_state() {
    let cpu = Z80::new(TestBus::new());
    let regs = cpu.regs();

    assert_eq!(regs.pc, 0);
    assert_eq!(regs.sp, 0);
    assert_eq!(regs.ix.word(), 0xFFFF);
    assert_eq!(regs.iy.word(), 0xFFFF);
    assert_eq!(regs.f(), ZF);
    assert_eq!(regs.a(), 0);
    assert_eq!(regs.im, 0);
    assert!(!regs.iff1 && !regs.iff2 && !regs.halted);
    assert_eq!(cpu.bus().pc_changes, vec![0x0000]);
}

#[test]
fn test_ld_a_n_then_halt() {
    let mut cpu = cpu_with(&[
        0x3E, 0x42, // LD A, 0x42
        0x76, // HALT
    ]);

    run_until_halt(&mut cpu);

    assert_eq!(cpu.regs().a(), 0x42);
    assert!(cpu.regs().halted);
    // PC stays on the HALT opcode
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn test_execute_returns_whole_instruction_costs() {
    let mut cpu = cpu_with(&[
        0x00, // NOP
        0x01, 0x34, 0x12, // LD BC, 0x1234
        0xCD, 0x00, 0x10, // CALL 0x1000
    ]);

    assert_eq!(step(&mut cpu), 4);
    assert_eq!(step(&mut cpu), 10);
    assert_eq!(step(&mut cpu), 17);
    assert_eq!(cpu.pc(), 0x1000);
    assert_eq!(cpu.bus().peek16(cpu.sp()), 0x0007);
}

#[test]
fn test_execute_overshoots_by_last_instruction() {
    // Four 10-cycle LD BC,nn
    let mut cpu = cpu_with(&[0x01, 0, 0, 0x01, 0, 0, 0x01, 0, 0, 0x01, 0, 0]);
    assert_eq!(cpu.execute(25), 30);
    assert_eq!(cpu.pc(), 9);
}

#[test]
fn test_push_pop_af() {
    let mut cpu = cpu_with(&[
        0xF5, // PUSH AF
        0xC1, // POP BC
    ]);
    cpu.regs_mut().af.set_word(0xA5C3);

    step(&mut cpu);
    step(&mut cpu);

    assert_eq!(cpu.regs().bc.word(), 0xA5C3);
    assert_eq!(cpu.sp(), 0xF000);
}

#[test]
fn test_conditional_call_and_return_costs() {
    let mut cpu = cpu_with(&[
        0xC4, 0x00, 0x10, // CALL NZ, 0x1000 (not taken, Z set at reset)
        0xCC, 0x00, 0x10, // CALL Z, 0x1000
    ]);
    cpu.bus_mut().load(0x1000, &[0xC0, 0xC8]); // RET NZ; RET Z

    assert_eq!(step(&mut cpu), 10);
    assert_eq!(cpu.pc(), 3);
    assert_eq!(step(&mut cpu), 17);
    assert_eq!(cpu.pc(), 0x1000);
    assert_eq!(step(&mut cpu), 5);
    assert_eq!(step(&mut cpu), 11);
    assert_eq!(cpu.pc(), 6);
}

#[test]
fn test_djnz_counts_down() {
    let mut cpu = cpu_with(&[
        0x06, 0x03, // LD B, 3
        0x3C, // INC A
        0x10, 0xFD, // DJNZ -3
        0x76, // HALT
    ]);

    let total = run_until_halt(&mut cpu);

    assert_eq!(cpu.regs().a(), 3);
    assert_eq!(cpu.regs().bc.hi(), 0);
    // LD 7, 3 x INC 4, 2 x DJNZ taken 13, DJNZ fallthrough 8, HALT 4
    assert_eq!(total, 7 + 12 + 26 + 8 + 4);
}

/// Reference flags for ADD/ADC computed bit by bit.
fn reference_add_flags(a: u8, v: u8, carry: bool) -> (u8, u8) {
    let c = u16::from(carry);
    let wide = u16::from(a) + u16::from(v) + c;
    let res = wide as u8;
    let mut f = res & (YF | XF);
    if res & 0x80 != 0 {
        f |= SF;
    }
    if res == 0 {
        f |= ZF;
    }
    if (a & 0x0F) as u16 + (v & 0x0F) as u16 + c > 0x0F {
        f |= HF;
    }
    if (!(a ^ v) & (a ^ res) & 0x80) != 0 {
        f |= PF;
    }
    if wide > 0xFF {
        f |= CF;
    }
    (res, f)
}

/// Reference flags for SUB/SBC computed bit by bit.
fn reference_sub_flags(a: u8, v: u8, carry: bool) -> (u8, u8) {
    let c = i16::from(carry);
    let wide = i16::from(a) - i16::from(v) - c;
    let res = wide as u8;
    let mut f = NF | (res & (YF | XF));
    if res & 0x80 != 0 {
        f |= SF;
    }
    if res == 0 {
        f |= ZF;
    }
    if i16::from(a & 0x0F) - i16::from(v & 0x0F) - c < 0 {
        f |= HF;
    }
    if ((a ^ v) & (a ^ res) & 0x80) != 0 {
        f |= PF;
    }
    if wide < 0 {
        f |= CF;
    }
    (res, f)
}

#[test]
fn test_adc_and_sbc_flags_match_reference_for_all_operands() {
    let mut cpu = cpu_with(&[
        0x88, // ADC A, B
        0x98, // SBC A, B
    ]);

    for a in 0..=255u8 {
        for v in 0..=255u8 {
            for carry in [false, true] {
                let f_in = if carry { CF } else { 0 };

                cpu.regs_mut().pc = 0;
                cpu.regs_mut().set_a(a);
                cpu.regs_mut().set_f(f_in);
                cpu.regs_mut().bc.set_hi(v);
                step(&mut cpu);
                let (res, f) = reference_add_flags(a, v, carry);
                assert_eq!(cpu.regs().a(), res, "ADC {a:02X},{v:02X},{carry}");
                assert_eq!(cpu.regs().f(), f, "ADC {a:02X},{v:02X},{carry}");

                cpu.regs_mut().set_a(a);
                cpu.regs_mut().set_f(f_in);
                step(&mut cpu);
                let (res, f) = reference_sub_flags(a, v, carry);
                assert_eq!(cpu.regs().a(), res, "SBC {a:02X},{v:02X},{carry}");
                assert_eq!(cpu.regs().f(), f, "SBC {a:02X},{v:02X},{carry}");
            }
        }
    }
}

#[test]
fn test_cp_leaves_accumulator() {
    let mut cpu = cpu_with(&[0xFE, 0x50]); // CP 0x50
    cpu.regs_mut().set_a(0x40);

    step(&mut cpu);

    assert_eq!(cpu.regs().a(), 0x40);
    let f = cpu.regs().f();
    assert_ne!(f & CF, 0);
    assert_ne!(f & NF, 0);
    assert_eq!(f & ZF, 0);
}

#[test]
fn test_in_and_out_use_a_as_high_port_byte() {
    let mut cpu = cpu_with(&[
        0x3E, 0x12, // LD A, 0x12
        0xD3, 0x34, // OUT (0x34), A
        0xDB, 0x56, // IN A, (0x56)
    ]);
    cpu.bus_mut().queue_io(0x1256, &[0x99]);

    step(&mut cpu);
    step(&mut cpu);
    step(&mut cpu);

    assert_eq!(cpu.bus().io_writes, vec![(0x1234, 0x12)]);
    assert_eq!(cpu.regs().a(), 0x99);
}

#[test]
fn test_ex_sp_hl() {
    let mut cpu = cpu_with(&[0xE3]); // EX (SP), HL
    cpu.regs_mut().hl.set_word(0x1234);
    cpu.bus_mut().load(0xF000, &[0x78, 0x56]);

    assert_eq!(step(&mut cpu), 19);

    assert_eq!(cpu.regs().hl.word(), 0x5678);
    assert_eq!(cpu.bus().peek16(0xF000), 0x1234);
}

#[test]
fn test_cb_rotate_and_bit() {
    let mut cpu = cpu_with(&[
        0xCB, 0x00, // RLC B
        0xCB, 0x7E, // BIT 7, (HL)
    ]);
    cpu.regs_mut().bc.set_hi(0x81);
    cpu.regs_mut().hl.set_word(0x4000);
    cpu.bus_mut().load(0x4000, &[0x7F]);

    assert_eq!(step(&mut cpu), 8);
    assert_eq!(cpu.regs().bc.hi(), 0x03);
    assert_ne!(cpu.regs().f() & CF, 0);

    assert_eq!(step(&mut cpu), 12);
    assert_ne!(cpu.regs().f() & ZF, 0);
    assert_ne!(cpu.regs().f() & HF, 0);
    // CB fetch bumps R twice
    assert_eq!(cpu.regs().r, 4);
}

#[test]
fn test_ld_ix_nn_and_indexed_store() {
    let mut cpu = cpu_with(&[
        0xDD, 0x21, 0x00, 0x40, // LD IX, 0x4000
        0xDD, 0x36, 0xFE, 0x55, // LD (IX-2), 0x55
        0xFD, 0x21, 0x10, 0x40, // LD IY, 0x4010
        0xFD, 0x7E, 0x05, // LD A, (IY+5)
    ]);
    cpu.bus_mut().load(0x4015, &[0xAB]);

    assert_eq!(step(&mut cpu), 14);
    assert_eq!(step(&mut cpu), 19);
    step(&mut cpu);
    assert_eq!(step(&mut cpu), 19);

    assert_eq!(cpu.regs().ix.word(), 0x4000);
    assert_eq!(cpu.bus().peek(0x3FFE), 0x55);
    assert_eq!(cpu.regs().a(), 0xAB);
}

#[test]
fn test_stacked_prefixes_last_one_wins() {
    let mut cpu = cpu_with(&[
        0xDD, 0xFD, 0x21, 0x34, 0x12, // DD FD LD IY, 0x1234
    ]);

    assert_eq!(step(&mut cpu), 4 + 14);

    assert_eq!(cpu.regs().iy.word(), 0x1234);
    assert_eq!(cpu.regs().ix.word(), 0xFFFF);
    // One bump per fetched byte plus one for the indexed op
    assert_eq!(cpu.regs().r, 4);
}

#[test]
fn test_index_halves() {
    let mut cpu = cpu_with(&[
        0xDD, 0x26, 0x12, // LD IXH, 0x12
        0xDD, 0x2E, 0x34, // LD IXL, 0x34
        0xDD, 0x44, // LD B, IXH
        0xDD, 0x6C, // LD IXL, IXH
        0xDD, 0x85, // ADD A, IXL
        0xDD, 0x66, 0x00, // LD H, (IX+0)
    ]);
    cpu.bus_mut().load(0x1212, &[0x77]);

    for _ in 0..6 {
        step(&mut cpu);
    }

    assert_eq!(cpu.regs().bc.hi(), 0x12);
    assert_eq!(cpu.regs().ix.word(), 0x1212);
    assert_eq!(cpu.regs().a(), 0x12);
    // (IX+d) forms move the real H
    assert_eq!(cpu.regs().hl.hi(), 0x77);
}

#[test]
fn test_prefix_without_indexed_form_runs_plain_op() {
    let mut cpu = cpu_with(&[
        0xDD, 0xEB, // EX DE, HL (IX untouched)
        0xDD, 0x04, // INC B
    ]);
    cpu.regs_mut().de.set_word(0x1111);
    cpu.regs_mut().hl.set_word(0x2222);

    // Only the XY entry is charged
    assert_eq!(step(&mut cpu), 4);
    assert_eq!(cpu.regs().de.word(), 0x2222);
    assert_eq!(cpu.regs().hl.word(), 0x1111);
    assert_eq!(cpu.regs().ix.word(), 0xFFFF);

    step(&mut cpu);
    assert_eq!(cpu.regs().bc.hi(), 1);
    // Two fetches per instruction, no extra bump for the fall-through
    assert_eq!(cpu.regs().r, 4);
}

#[test]
fn test_ld_ixh_ixh_and_ld_iyl_iyl_do_nothing() {
    let mut cpu = cpu_with(&[
        0xDD, 0x64, // LD IXH, IXH
        0xFD, 0x6D, // LD IYL, IYL
    ]);
    cpu.regs_mut().ix.set_word(0x1234);

    // Only the two opcode fetches advance R
    step(&mut cpu);
    assert_eq!(cpu.regs().r, 2);
    step(&mut cpu);
    assert_eq!(cpu.regs().r, 4);
    assert_eq!(cpu.regs().ix.word(), 0x1234);
    assert_eq!(cpu.pc(), 4);
}

#[test]
fn test_ddcb_shift_copies_into_register() {
    let mut cpu = cpu_with(&[
        0xDD, 0xCB, 0x01, 0x00, // RLC (IX+1) -> B
        0xDD, 0xCB, 0x01, 0x46, // BIT 0, (IX+1)
        0xFD, 0xCB, 0x02, 0xFE, // SET 7, (IY+2)
    ]);
    cpu.regs_mut().ix.set_word(0x4000);
    cpu.regs_mut().iy.set_word(0x4000);
    cpu.bus_mut().load(0x4001, &[0x80, 0x01]);

    assert_eq!(step(&mut cpu), 23);
    assert_eq!(cpu.bus().peek(0x4001), 0x01);
    assert_eq!(cpu.regs().bc.hi(), 0x01);

    assert_eq!(step(&mut cpu), 20);
    assert_eq!(cpu.regs().f() & ZF, 0);
    // X and Y come from the high byte of IX+d (0x40)
    assert_eq!(cpu.regs().f() & (YF | XF), 0x40 & (YF | XF));

    step(&mut cpu);
    assert_eq!(cpu.bus().peek(0x4002), 0x81);
}

#[test]
fn test_ed_sbc_hl_and_ld_nn_rr() {
    let mut cpu = cpu_with(&[
        0xED, 0x52, // SBC HL, DE
        0xED, 0x43, 0x00, 0x50, // LD (0x5000), BC
        0xED, 0x6B, 0x00, 0x50, // LD HL, (0x5000)
    ]);
    cpu.regs_mut().hl.set_word(0x1000);
    cpu.regs_mut().de.set_word(0x1001);
    cpu.regs_mut().bc.set_word(0xBEEF);
    cpu.regs_mut().set_f(0);

    assert_eq!(step(&mut cpu), 15);
    assert_eq!(cpu.regs().hl.word(), 0xFFFF);
    assert_ne!(cpu.regs().f() & CF, 0);
    assert_ne!(cpu.regs().f() & SF, 0);

    assert_eq!(step(&mut cpu), 20);
    assert_eq!(cpu.bus().peek16(0x5000), 0xBEEF);
    step(&mut cpu);
    assert_eq!(cpu.regs().hl.word(), 0xBEEF);
}

#[test]
fn test_ld_a_r_reports_iff2_and_bit7() {
    let mut cpu = cpu_with(&[
        0xED, 0x4F, // LD R, A
        0xED, 0x5F, // LD A, R
    ]);
    cpu.regs_mut().set_a(0x80);
    cpu.regs_mut().iff2 = true;

    step(&mut cpu);
    step(&mut cpu);

    // R was 0x80 after LD R,A, then two fetches
    assert_eq!(cpu.regs().a(), 0x82);
    assert_ne!(cpu.regs().f() & PF, 0);
    assert_ne!(cpu.regs().f() & SF, 0);
}

#[test]
fn test_rld_rotates_digits() {
    let mut cpu = cpu_with(&[0xED, 0x6F]); // RLD
    cpu.regs_mut().set_a(0x12);
    cpu.regs_mut().hl.set_word(0x4000);
    cpu.bus_mut().load(0x4000, &[0x34]);

    step(&mut cpu);

    assert_eq!(cpu.regs().a(), 0x13);
    assert_eq!(cpu.bus().peek(0x4000), 0x42);
}

#[test]
fn test_in_f_c_sets_flags_only() {
    let mut cpu = cpu_with(&[0xED, 0x70]); // IN F, (C)
    cpu.regs_mut().bc.set_word(0x0010);
    cpu.regs_mut().set_a(0x11);
    cpu.bus_mut().queue_io(0x0010, &[0x00]);

    step(&mut cpu);

    assert_eq!(cpu.regs().a(), 0x11);
    assert_ne!(cpu.regs().f() & ZF, 0);
    assert_ne!(cpu.regs().f() & PF, 0);
}

#[test]
fn test_undefined_ed_opcode_is_nop() {
    let mut cpu = cpu_with(&[0xED, 0x00]);
    let before = *cpu.regs();

    assert_eq!(step(&mut cpu), 8);

    assert_eq!(cpu.pc(), 2);
    assert_eq!(cpu.regs().af, before.af);
    assert_eq!(cpu.regs().bc, before.bc);
}

#[test]
fn test_replaced_cycle_table_takes_effect() {
    let mut cpu = cpu_with(&[0x00, 0x00]);
    let mut table = *cpu.cycle_table(CycleTable::Op);
    table[0x00] = 3;
    cpu.set_cycle_table(CycleTable::Op, &table);

    assert_eq!(step(&mut cpu), 3);
    assert_eq!(cpu.cycle_table(CycleTable::Op)[0x00], 3);
}

#[test]
fn test_cycle_tables_by_index() {
    let mut cpu = cpu_with(&[0x18, 0x00, 0x76]); // JR +0; HALT
    assert_eq!(cpu.cycle_table_by_index(5), Some(cpu.cycle_table(CycleTable::Ex)));
    assert_eq!(cpu.cycle_table_by_index(6), None);

    let mut table = *cpu.cycle_table(CycleTable::Op);
    table[0x18] = 20;
    cpu.set_cycle_table_by_index(0, &table);
    // Out of range, dropped
    cpu.set_cycle_table_by_index(6, &[0; 256]);

    assert_eq!(step(&mut cpu), 20);
    assert_eq!(cpu.cycle_table_by_index(0).map(|t| t[0x18]), Some(20));
}

#[test]
fn test_set_pc_notifies_bus() {
    let mut cpu = cpu_with(&[]);
    cpu.set_pc(0x1234);
    cpu.set_sp(0x8000);

    assert_eq!(cpu.bus().pc_changes.last(), Some(&0x1234));
    assert_eq!(cpu.sp(), 0x8000);
}

#[test]
fn test_jumps_notify_bus() {
    let mut cpu = cpu_with(&[
        0xC3, 0x00, 0x02, // JP 0x0200
    ]);
    cpu.bus_mut().load(0x0200, &[0x18, 0x10]); // JR +16

    step(&mut cpu);
    step(&mut cpu);

    let changes = &cpu.bus().pc_changes;
    assert_eq!(&changes[changes.len() - 2..], &[0x0200, 0x0212]);
}

#[test]
fn test_burn_rounds_up_to_nops() {
    let mut cpu = cpu_with(&[]);
    cpu.burn(5);
    assert_eq!(cpu.regs().r, 2);
    assert_eq!(cpu.remaining_cycles(), -8);
    cpu.burn(0);
    assert_eq!(cpu.regs().r, 2);
}

#[test]
fn test_largest_budgets_do_not_overflow() {
    let mut cpu = cpu_with(&[0x76]); // HALT
    assert_eq!(cpu.execute(i32::MAX), i32::MAX);
    assert!(cpu.regs().halted);
    assert_eq!(cpu.remaining_cycles(), -1);

    let mut cpu = cpu_with(&[]);
    cpu.burn(i32::MAX);
    assert_eq!(cpu.remaining_cycles(), i32::MIN);

    // Still halted, so the next call burns the whole budget again
    let mut cpu = cpu_with(&[0x76]);
    cpu.execute(1);
    assert_eq!(cpu.execute(i32::MAX), i32::MAX);
}
