//! End-to-end: project text in, engine calls out.

use ustkit::{pitch, pitchbend, FlagSet, Oto, ResamplerArgs, UstProject, WavtoolArgs};

const PROJECT: &str = "\
[#VERSION]\r\n\
UST Version1.2\r\n\
[#SETTING]\r\n\
Tempo=120.00\r\n\
ProjectName=pipeline\r\n\
[#0000]\r\n\
Length=480\r\n\
Lyric=あ\r\n\
NoteNum=60\r\n\
Flags=g-5H50\r\n\
Envelope=0,5,35,0,100,100,0,%\r\n\
[#0001]\r\n\
Length=240\r\n\
Lyric=い\r\n\
NoteNum=64\r\n\
PBS=-30;\r\n\
PBW=60,40\r\n\
PBY=3\r\n\
Envelope=0,5,35,0,100,100,0,%,12\r\n\
[#TRACKEND]\r\n";

const OTO: &[&str] = &[
    "_ああいあうえあ.wav=あ_C4,100,150,-500,120,30",
    "_ああいあうえあ.wav=い_C4,1100,150,-500,120,30",
];

#[test]
fn project_to_resampler_call() {
    let project = UstProject::parse(PROJECT).unwrap();
    let oto = Oto::parse(OTO.iter().copied()).unwrap();
    let tempo = project.tempo().unwrap();
    let note = &project.notes()[1];

    let postfix = oto.common_postfix();
    let alias = format!("{}{}", note.lyric, postfix);
    let timing = oto.alias(&alias).unwrap();

    // sample the resolved glide into a pitchbend curve, one frame per 5ms
    let glide = note.portamento.as_ref().unwrap();
    assert_eq!(glide.start_magnitude(), Some(-4.0));
    let frames: Vec<i32> = (0..20)
        .map(|i| glide.sample_at_time(i as f64 * 5.0).unwrap().round() as i32)
        .collect();

    let mut call = ResamplerArgs::new();
    call.set_input_file(&timing.file_name);
    call.set_output_file("cache/0001.wav");
    call.set_note_num(note.note_num).unwrap();
    call.set_velocity(note.velocity.unwrap_or(100.0));
    call.set_flag_text(note.flag_text.as_deref().unwrap_or(""));
    call.set_offset(timing.offset);
    call.set_required_length(note.duration_ms(tempo) + 50.0);
    call.set_consonant(timing.consonant);
    call.set_cutoff(timing.cutoff);
    call.set_intensity(note.intensity.unwrap_or(100.0));
    call.set_modulation(note.modulation.unwrap_or(0.0));
    call.set_tempo(tempo);
    call.set_pitchbend(&frames).unwrap();

    assert_eq!(call.note_name(), "E4");
    assert_eq!(call.args().len(), 13);
    // the encoded curve decodes back to exactly what we sampled
    assert_eq!(call.pitchbend().unwrap(), frames);
    // and the first frame carries the glide's starting offset
    assert_eq!(frames[0], 0); // sample at t=0 on an S-curve starts at 0 delta
}

#[test]
fn project_to_wavtool_call() {
    let project = UstProject::parse(PROJECT).unwrap();
    let note = &project.notes()[1];
    let call = WavtoolArgs::with_velocity(
        "take.wav",
        "cache/0001.wav",
        0.0,
        note.length as f64,
        project.tempo().unwrap(),
        120.0,
        30.0,
        &note.envelope,
        note.velocity.unwrap_or(100.0),
    );
    // envelope had p4 only: 12 fixed arguments plus one
    assert_eq!(call.args().len(), 13);
    assert_eq!(call.duration_spec(), "240@120+120");
    assert_eq!(call.args()[12], "12");
}

#[test]
fn flags_survive_the_trip() {
    let project = UstProject::parse(PROJECT).unwrap();
    let flags = project.notes()[0].flags().unwrap();
    assert_eq!(flags.first_value("g").unwrap(), Some(-5.0));
    let engine_side = FlagSet::parse(flags.text()).unwrap();
    assert_eq!(engine_side.first_value("H").unwrap(), Some(50.0));
}

#[test]
fn tick_math_matches_project_tempo() {
    let project = UstProject::parse(PROJECT).unwrap();
    let tempo = project.tempo().unwrap();
    assert_eq!(pitch::ticks_to_ms(480.0, tempo), 500.0);
    assert_eq!(project.notes()[0].duration_ms(tempo), 500.0);
}

#[test]
fn pitchbend_codec_is_reachable_from_umbrella() {
    let text = pitchbend::encode(&[0, 0, 0, -12]).unwrap();
    assert_eq!(pitchbend::decode(&text).unwrap(), vec![0, 0, 0, -12]);
}
