mod lifecycle;
mod one_shot;
