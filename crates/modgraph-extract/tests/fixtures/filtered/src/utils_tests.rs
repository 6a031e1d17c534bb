fn exercises_shave() {}
